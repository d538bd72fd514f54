use std::path::PathBuf;

use ipfsx_api::{DEFAULT_GATEWAY_HOST, gateway_url_on};
use ipfsx_transfer::{PROGRESS_CAP, TransferEvent, UploadReceipt};

use crate::notice::NoticeQueue;

/// The file the user picked, replaced wholesale on a new selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    pub size: u64,
    pub path: PathBuf,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, size: u64, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            size,
            path: path.into(),
        }
    }
}

/// Observable phase of the widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UploadPhase {
    #[default]
    Idle,
    FileSelected,
    Uploading,
    Succeeded,
    Failed,
}

/// Internal state. Each variant carries exactly the data valid in that
/// phase, so "uploading with no file" or "receipt while in flight" have
/// no representation.
#[derive(Debug, Clone)]
enum State {
    Idle,
    FileSelected {
        file: SelectedFile,
    },
    Uploading {
        file: SelectedFile,
        progress: u8,
        notice: u64,
    },
    Succeeded {
        file: SelectedFile,
        receipt: UploadReceipt,
    },
    Failed {
        file: SelectedFile,
        progress: u8,
        message: String,
    },
}

/// The upload widget: select → upload → result, one transfer at a time.
#[derive(Debug, Clone)]
pub struct UploadWidget {
    state: State,
    notices: NoticeQueue,
    gateway_host: String,
}

impl Default for UploadWidget {
    fn default() -> Self {
        Self::new()
    }
}

impl UploadWidget {
    /// Creates an idle widget rendering links on the default gateway.
    pub fn new() -> Self {
        Self::with_gateway(DEFAULT_GATEWAY_HOST)
    }

    /// Creates an idle widget with a specific gateway host.
    pub fn with_gateway(host: impl Into<String>) -> Self {
        Self {
            state: State::Idle,
            notices: NoticeQueue::new(),
            gateway_host: host.into(),
        }
    }

    pub fn phase(&self) -> UploadPhase {
        match self.state {
            State::Idle => UploadPhase::Idle,
            State::FileSelected { .. } => UploadPhase::FileSelected,
            State::Uploading { .. } => UploadPhase::Uploading,
            State::Succeeded { .. } => UploadPhase::Succeeded,
            State::Failed { .. } => UploadPhase::Failed,
        }
    }

    pub fn is_uploading(&self) -> bool {
        matches!(self.state, State::Uploading { .. })
    }

    pub fn selected_file(&self) -> Option<&SelectedFile> {
        match &self.state {
            State::Idle => None,
            State::FileSelected { file }
            | State::Uploading { file, .. }
            | State::Succeeded { file, .. }
            | State::Failed { file, .. } => Some(file),
        }
    }

    /// Displayed percentage: 0 before an upload, live while uploading,
    /// 100 after success, left as-is after failure.
    pub fn progress(&self) -> u8 {
        match &self.state {
            State::Idle | State::FileSelected { .. } => 0,
            State::Uploading { progress, .. } | State::Failed { progress, .. } => *progress,
            State::Succeeded { .. } => 100,
        }
    }

    /// The retained receipt, present only after a successful upload.
    pub fn receipt(&self) -> Option<&UploadReceipt> {
        match &self.state {
            State::Succeeded { receipt, .. } => Some(receipt),
            _ => None,
        }
    }

    /// Failure message, present only in the failed phase.
    pub fn failure(&self) -> Option<&str> {
        match &self.state {
            State::Failed { message, .. } => Some(message),
            _ => None,
        }
    }

    /// Public gateway link for the retained receipt.
    pub fn gateway_url(&self) -> Option<String> {
        self.receipt()
            .map(|r| gateway_url_on(&self.gateway_host, &r.cid))
    }

    pub fn notices(&self) -> &NoticeQueue {
        &self.notices
    }

    pub fn notices_mut(&mut self) -> &mut NoticeQueue {
        &mut self.notices
    }

    /// Replaces the selection. Clears any retained receipt and resets
    /// progress. Ignored while an upload is in flight — there is no
    /// cancellation, so the selection is pinned until the transfer ends.
    pub fn select_file(&mut self, file: SelectedFile) {
        if self.is_uploading() {
            tracing::debug!(name = %file.name, "selection ignored during active upload");
            return;
        }
        self.state = State::FileSelected { file };
    }

    /// Starts an upload if one can start.
    ///
    /// Returns the file to hand to the transfer client, or `None` when
    /// nothing is selected or a transfer is already active; in both
    /// cases state is left untouched. The caller must invoke the
    /// transfer client exactly once per `Some`.
    pub fn begin_upload(&mut self) -> Option<SelectedFile> {
        match &self.state {
            State::Idle | State::Uploading { .. } => None,
            State::FileSelected { file }
            | State::Succeeded { file, .. }
            | State::Failed { file, .. } => {
                let file = file.clone();
                let notice = self.notices.loading(format!("Uploading {}…", file.name));
                self.state = State::Uploading {
                    file: file.clone(),
                    progress: 0,
                    notice,
                };
                Some(file)
            }
        }
    }

    /// Feeds a progress approximation in.
    ///
    /// Capped at [`PROGRESS_CAP`] and never allowed to move backwards,
    /// whichever of the byte-counter or the ramp produced it. Ignored
    /// outside the uploading phase.
    pub fn on_progress(&mut self, pct: u8) {
        if let State::Uploading { progress, .. } = &mut self.state {
            *progress = (*progress).max(pct.min(PROGRESS_CAP));
        }
    }

    /// Completes the active upload. Ignored outside the uploading phase.
    pub fn on_success(&mut self, receipt: UploadReceipt) {
        if let State::Uploading { file, notice, .. } = &self.state {
            let file = file.clone();
            self.notices
                .resolve_success(*notice, format!("Upload complete: {}", receipt.cid));
            tracing::info!(cid = %receipt.cid, name = %receipt.name, "upload succeeded");
            self.state = State::Succeeded { file, receipt };
        }
    }

    /// Fails the active upload. The selection stays intact so the user
    /// can retry; displayed progress is left where it was.
    pub fn on_failure(&mut self, message: impl Into<String>) {
        if let State::Uploading {
            file,
            progress,
            notice,
        } = &self.state
        {
            let (file, progress, notice) = (file.clone(), *progress, *notice);
            let message = message.into();
            self.notices
                .resolve_error(notice, format!("Upload failed: {message}"));
            tracing::warn!(name = %file.name, error = %message, "upload failed");
            self.state = State::Failed {
                file,
                progress,
                message,
            };
        }
    }

    /// Applies one event from the transfer's progress channel.
    pub fn apply(&mut self, event: TransferEvent) {
        match event {
            TransferEvent::Progress { pct, .. } => self.on_progress(pct),
            TransferEvent::Completed { receipt, .. } => self.on_success(receipt),
            TransferEvent::Failed { message, .. } => self.on_failure(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notice::NoticeKind;
    use uuid::Uuid;

    fn small_file() -> SelectedFile {
        SelectedFile::new("a.txt", 3, "/tmp/a.txt")
    }

    fn receipt_for(file: &SelectedFile, cid: &str) -> UploadReceipt {
        UploadReceipt {
            cid: cid.into(),
            name: file.name.clone(),
            size: file.size,
        }
    }

    #[test]
    fn select_yields_no_receipt() {
        let mut w = UploadWidget::new();
        w.select_file(small_file());
        assert_eq!(w.phase(), UploadPhase::FileSelected);
        assert!(w.receipt().is_none());
        assert_eq!(w.progress(), 0);
    }

    #[test]
    fn begin_without_selection_is_a_silent_noop() {
        let mut w = UploadWidget::new();
        assert!(w.begin_upload().is_none());
        assert_eq!(w.phase(), UploadPhase::Idle);
        assert!(w.notices().is_empty());
    }

    #[test]
    fn begin_starts_exactly_one_upload() {
        let mut w = UploadWidget::new();
        w.select_file(small_file());

        let started = w.begin_upload().unwrap();
        assert_eq!(started, small_file());
        assert_eq!(w.phase(), UploadPhase::Uploading);
        assert_eq!(w.progress(), 0);

        // Second begin while active: rejected, state unchanged.
        assert!(w.begin_upload().is_none());
        assert_eq!(w.phase(), UploadPhase::Uploading);
    }

    #[test]
    fn progress_is_monotonic_and_capped() {
        let mut w = UploadWidget::new();
        w.select_file(small_file());
        w.begin_upload().unwrap();

        w.on_progress(50);
        assert_eq!(w.progress(), 50);
        w.on_progress(30); // stale ramp tick behind the byte counter
        assert_eq!(w.progress(), 50);
        w.on_progress(95); // beyond the finalization reserve
        assert_eq!(w.progress(), PROGRESS_CAP);
    }

    #[test]
    fn successful_upload_scenario() {
        let mut w = UploadWidget::new();
        let file = small_file();
        w.select_file(file.clone());
        w.begin_upload().unwrap();
        w.on_progress(45);
        w.on_success(receipt_for(&file, "bafy123"));

        assert_eq!(w.phase(), UploadPhase::Succeeded);
        assert_eq!(w.progress(), 100);
        let receipt = w.receipt().unwrap();
        assert_eq!(receipt.cid, "bafy123");
        assert_eq!(receipt.name, "a.txt");
        assert_eq!(receipt.size, 3);
        assert_eq!(
            w.gateway_url().unwrap(),
            "https://ipfs.io/ipfs/bafy123"
        );
    }

    #[test]
    fn failure_keeps_selection_and_progress_for_retry() {
        let mut w = UploadWidget::new();
        w.select_file(small_file());
        w.begin_upload().unwrap();
        w.on_progress(40);
        w.on_failure("transfer timed out");

        assert_eq!(w.phase(), UploadPhase::Failed);
        assert_eq!(w.selected_file(), Some(&small_file()));
        assert_eq!(w.progress(), 40);
        assert_eq!(w.failure(), Some("transfer timed out"));
        assert!(w.receipt().is_none());

        // Retry is a fresh upload of the intact selection.
        assert_eq!(w.begin_upload(), Some(small_file()));
        assert_eq!(w.progress(), 0);
    }

    #[test]
    fn new_selection_clears_prior_receipt() {
        let mut w = UploadWidget::new();
        let file = small_file();
        w.select_file(file.clone());
        w.begin_upload().unwrap();
        w.on_success(receipt_for(&file, "bafy123"));
        assert!(w.receipt().is_some());

        w.select_file(SelectedFile::new("b.txt", 9, "/tmp/b.txt"));
        assert!(w.receipt().is_none());
        assert_eq!(w.progress(), 0);
        assert_eq!(w.phase(), UploadPhase::FileSelected);
    }

    #[test]
    fn selection_is_ignored_while_uploading() {
        let mut w = UploadWidget::new();
        w.select_file(small_file());
        w.begin_upload().unwrap();

        w.select_file(SelectedFile::new("b.txt", 9, "/tmp/b.txt"));
        assert_eq!(w.selected_file().unwrap().name, "a.txt");
        assert_eq!(w.phase(), UploadPhase::Uploading);
    }

    #[test]
    fn stale_events_outside_uploading_are_ignored() {
        let mut w = UploadWidget::new();
        let file = small_file();
        w.on_progress(50);
        w.on_success(receipt_for(&file, "bafy123"));
        w.on_failure("late");
        assert_eq!(w.phase(), UploadPhase::Idle);
        assert!(w.receipt().is_none());
    }

    #[test]
    fn apply_dispatches_channel_events() {
        let mut w = UploadWidget::new();
        let file = small_file();
        w.select_file(file.clone());
        w.begin_upload().unwrap();

        let id = Uuid::new_v4();
        w.apply(TransferEvent::Progress { upload_id: id, pct: 10 });
        assert_eq!(w.progress(), 10);
        w.apply(TransferEvent::Completed {
            upload_id: id,
            receipt: receipt_for(&file, "bafy123"),
        });
        assert_eq!(w.phase(), UploadPhase::Succeeded);
    }

    #[test]
    fn notices_follow_the_loading_resolution_flow() {
        let mut w = UploadWidget::new();
        let file = small_file();
        w.select_file(file.clone());
        w.begin_upload().unwrap();

        assert_eq!(w.notices().len(), 1);
        let loading = w.notices().iter().next().unwrap();
        assert_eq!(loading.kind, NoticeKind::Loading);
        let loading_id = loading.id;

        w.on_success(receipt_for(&file, "bafy123"));
        let resolved = w.notices().get(loading_id).unwrap();
        assert_eq!(resolved.kind, NoticeKind::Success);
        assert!(resolved.text.contains("bafy123"));
        assert_eq!(w.notices().len(), 1);
    }

    #[test]
    fn failure_notice_is_an_error() {
        let mut w = UploadWidget::new();
        w.select_file(small_file());
        w.begin_upload().unwrap();
        w.on_failure("node unreachable");

        let notice = w.notices().iter().next().unwrap();
        assert_eq!(notice.kind, NoticeKind::Error);
        assert!(notice.text.contains("node unreachable"));
    }

    #[test]
    fn custom_gateway_host_is_used_for_links() {
        let mut w = UploadWidget::with_gateway("dweb.link");
        let file = small_file();
        w.select_file(file.clone());
        w.begin_upload().unwrap();
        w.on_success(receipt_for(&file, "bafy123"));
        assert_eq!(w.gateway_url().unwrap(), "https://dweb.link/ipfs/bafy123");
    }
}
