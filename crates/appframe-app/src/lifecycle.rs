//! Lifecycle states and the event arguments passed to lifecycle hooks

use std::fmt;
use std::str::FromStr;

/// Where an [`crate::Application`] is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LifecycleState {
    #[default]
    Uninitialized,
    Initialized,
    Running,
    Stopping,
    Stopped,
}

impl LifecycleState {
    pub fn is_running(&self) -> bool {
        matches!(self, LifecycleState::Running)
    }
}

/// Arguments for a cancellable notification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CancelEventArgs {
    pub cancel: bool,
}

impl CancelEventArgs {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Result of [`crate::Application::stop`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    /// Shutdown ran to completion
    Stopped,
    /// A `BeforeShutdown` observer or the `on_stopping` hook cancelled
    Cancelled,
    /// A stop was already in progress; nothing happened
    AlreadyStopping,
}

impl StopOutcome {
    pub fn is_stopped(&self) -> bool {
        matches!(self, StopOutcome::Stopped)
    }
}

/// The three activation notifications raised by `start`, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationPhase {
    Before,
    On,
    After,
}

impl ActivationPhase {
    pub const ALL: [ActivationPhase; 3] = [
        ActivationPhase::Before,
        ActivationPhase::On,
        ActivationPhase::After,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ActivationPhase::Before => "before_activated",
            ActivationPhase::On => "activated",
            ActivationPhase::After => "after_activated",
        }
    }
}

/// Arguments shared by the activation phases of a single `start`.
///
/// Handlers may set `exit_code` (returned by `start`) or `cancel` to stop
/// the remaining phases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivationEventArgs {
    pub first_run: bool,
    pub activation_type: ApplicationActivationType,
    /// Sub-command selected on the command line, if any
    pub command: Option<String>,
    pub file_names: Vec<String>,
    pub exit_code: i32,
    pub cancel: bool,
}

impl ActivationEventArgs {
    pub fn new(first_run: bool, activation_type: ApplicationActivationType) -> Self {
        Self {
            first_run,
            activation_type,
            command: None,
            file_names: Vec::new(),
            exit_code: 0,
            cancel: false,
        }
    }
}

/// How the application was activated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum ApplicationActivationType {
    AppointmentsProvider,
    BarcodeScannerProvider,
    CachedFileUpdater,
    CameraSettings,
    CommandLineLaunch,
    ComponentUI,
    Contact,
    ContactPanel,
    ContactPicker,
    Device,
    DevicePairing,
    DialReceiver,
    File,
    FileOpenPicker,
    FilePickerExperience,
    FileSavePicker,
    GameUIProvider,
    #[default]
    Launch,
    LockScreen,
    LockScreenCall,
    LockScreenComponent,
    PhoneCallActivation,
    PickerReturned,
    PickFileContinuation,
    PickFolderContinuation,
    PickSaveFileContinuation,
    Print3DWorkflow,
    PrintSupportJobUI,
    PrintSupportSettingsUI,
    PrintTaskSettings,
    PrintWorkflowForegroundTask,
    Protocol,
    ProtocolForResults,
    RestrictedLaunch,
    Search,
    ShareTarget,
    StartupTask,
    ToastNotification,
    UserDataAccountsProvider,
    VoiceCommand,
    VpnForeground,
    WalletAction,
    WebAccountProvider,
    WebAuthenticationBrokerContinuation,
}

impl ApplicationActivationType {
    pub const ALL: &'static [ApplicationActivationType] = &[
        Self::AppointmentsProvider,
        Self::BarcodeScannerProvider,
        Self::CachedFileUpdater,
        Self::CameraSettings,
        Self::CommandLineLaunch,
        Self::ComponentUI,
        Self::Contact,
        Self::ContactPanel,
        Self::ContactPicker,
        Self::Device,
        Self::DevicePairing,
        Self::DialReceiver,
        Self::File,
        Self::FileOpenPicker,
        Self::FilePickerExperience,
        Self::FileSavePicker,
        Self::GameUIProvider,
        Self::Launch,
        Self::LockScreen,
        Self::LockScreenCall,
        Self::LockScreenComponent,
        Self::PhoneCallActivation,
        Self::PickerReturned,
        Self::PickFileContinuation,
        Self::PickFolderContinuation,
        Self::PickSaveFileContinuation,
        Self::Print3DWorkflow,
        Self::PrintSupportJobUI,
        Self::PrintSupportSettingsUI,
        Self::PrintTaskSettings,
        Self::PrintWorkflowForegroundTask,
        Self::Protocol,
        Self::ProtocolForResults,
        Self::RestrictedLaunch,
        Self::Search,
        Self::ShareTarget,
        Self::StartupTask,
        Self::ToastNotification,
        Self::UserDataAccountsProvider,
        Self::VoiceCommand,
        Self::VpnForeground,
        Self::WalletAction,
        Self::WebAccountProvider,
        Self::WebAuthenticationBrokerContinuation,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::AppointmentsProvider => "AppointmentsProvider",
            Self::BarcodeScannerProvider => "BarcodeScannerProvider",
            Self::CachedFileUpdater => "CachedFileUpdater",
            Self::CameraSettings => "CameraSettings",
            Self::CommandLineLaunch => "CommandLineLaunch",
            Self::ComponentUI => "ComponentUI",
            Self::Contact => "Contact",
            Self::ContactPanel => "ContactPanel",
            Self::ContactPicker => "ContactPicker",
            Self::Device => "Device",
            Self::DevicePairing => "DevicePairing",
            Self::DialReceiver => "DialReceiver",
            Self::File => "File",
            Self::FileOpenPicker => "FileOpenPicker",
            Self::FilePickerExperience => "FilePickerExperience",
            Self::FileSavePicker => "FileSavePicker",
            Self::GameUIProvider => "GameUIProvider",
            Self::Launch => "Launch",
            Self::LockScreen => "LockScreen",
            Self::LockScreenCall => "LockScreenCall",
            Self::LockScreenComponent => "LockScreenComponent",
            Self::PhoneCallActivation => "PhoneCallActivation",
            Self::PickerReturned => "PickerReturned",
            Self::PickFileContinuation => "PickFileContinuation",
            Self::PickFolderContinuation => "PickFolderContinuation",
            Self::PickSaveFileContinuation => "PickSaveFileContinuation",
            Self::Print3DWorkflow => "Print3DWorkflow",
            Self::PrintSupportJobUI => "PrintSupportJobUI",
            Self::PrintSupportSettingsUI => "PrintSupportSettingsUI",
            Self::PrintTaskSettings => "PrintTaskSettings",
            Self::PrintWorkflowForegroundTask => "PrintWorkflowForegroundTask",
            Self::Protocol => "Protocol",
            Self::ProtocolForResults => "ProtocolForResults",
            Self::RestrictedLaunch => "RestrictedLaunch",
            Self::Search => "Search",
            Self::ShareTarget => "ShareTarget",
            Self::StartupTask => "StartupTask",
            Self::ToastNotification => "ToastNotification",
            Self::UserDataAccountsProvider => "UserDataAccountsProvider",
            Self::VoiceCommand => "VoiceCommand",
            Self::VpnForeground => "VpnForeground",
            Self::WalletAction => "WalletAction",
            Self::WebAccountProvider => "WebAccountProvider",
            Self::WebAuthenticationBrokerContinuation => "WebAuthenticationBrokerContinuation",
        }
    }
}

impl fmt::Display for ApplicationActivationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a string names no activation type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownActivationType(pub String);

impl fmt::Display for UnknownActivationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown activation type '{}'", self.0)
    }
}

impl std::error::Error for UnknownActivationType {}

impl FromStr for ApplicationActivationType {
    type Err = UnknownActivationType;

    /// Case-insensitive match on the variant name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.name().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| UnknownActivationType(s.to_string()))
    }
}

/// Result of the installation-status hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InstallationStatus {
    #[default]
    Unknown,
    Installed,
    New,
    Upgraded,
    Advertised,
}
