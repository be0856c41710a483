//! Platform feedback collaborators: vibration and system notifications

use tokio::{process::Command, runtime::Handle};
use tracing::{debug, info, warn};

/// Completion vibration, in milliseconds on/off/on...
pub const FINISH_VIBRATION: [u64; 5] = [200, 100, 300, 100, 200];

pub const FINISH_TITLE: &str = "Time's up!";
pub const FINISH_BODY: &str = "The countdown has finished";

/// Vibration motor
pub trait Haptics: Send + Sync {
    fn vibrate(&self, pattern: &[u64]);
}

/// System notification display
pub trait Notifier: Send + Sync {
    fn notify(&self, title: &str, body: &str);
}

/// Haptics for hosts without a motor: records the pattern in the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogHaptics;

impl Haptics for LogHaptics {
    fn vibrate(&self, pattern: &[u64]) {
        info!("Vibration pattern {:?}", pattern);
    }
}

/// Desktop notifications through `notify-send`
#[derive(Debug, Clone)]
pub struct DesktopNotifier {
    program: String,
}

impl DesktopNotifier {
    pub fn new() -> Self {
        Self {
            program: "notify-send".to_string(),
        }
    }
}

impl Default for DesktopNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier for DesktopNotifier {
    fn notify(&self, title: &str, body: &str) {
        let Ok(runtime) = Handle::try_current() else {
            warn!("No async runtime, dropping notification: {}", title);
            return;
        };

        let program = self.program.clone();
        let args = vec![
            "--app-name=counterdown".to_string(),
            title.to_string(),
            body.to_string(),
        ];

        // Fire-and-forget; the countdown never waits on the desktop
        runtime.spawn(async move {
            match Command::new(&program).args(&args).output().await {
                Ok(output) if output.status.success() => debug!("Notification shown"),
                Ok(output) => {
                    let stderr = String::from_utf8_lossy(&output.stderr);
                    warn!("{} failed: {}", program, stderr);
                }
                Err(e) => warn!("Failed to execute {}: {}", program, e),
            }
        });
    }
}

/// Check whether desktop notifications can be shown at all. Plays the role
/// of a previously granted notification permission.
pub async fn check_notifier_available() -> bool {
    match Command::new("notify-send").arg("--version").output().await {
        Ok(_) => {
            info!("notify-send is available");
            true
        }
        Err(e) => {
            warn!("notify-send is not available, notifications disabled: {}", e);
            false
        }
    }
}
