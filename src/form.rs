use crate::error::{Action, RequestError, ValidationError};
use crate::selection::SelectedFile;

#[derive(Debug, Clone)]
pub struct UploadJob {
    pub file: SelectedFile,
    pub query: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ChatJob {
    pub query: String,
}

/// Everything the analysis form shows. Nothing here outlives the session.
#[derive(Debug, Default)]
pub struct Form {
    pub file: Option<SelectedFile>,
    pub table_query: String,
    pub chat_query: String,
    pub response: String,
    pub error: String,
    uploading: bool,
    chatting: bool,
}

impl Form {
    pub fn select_file(&mut self, file: SelectedFile) {
        if !file.is_allowed() {
            self.file = None;
            self.fail(ValidationError::DisallowedType { mime: file.mime });
            return;
        }

        self.file = Some(file);
        self.error.clear();
        self.response.clear();
    }

    /// `None` means nothing should be sent.
    pub fn begin_upload(&mut self) -> Option<UploadJob> {
        if self.uploading {
            return None;
        }
        let Some(file) = self.file.clone() else {
            self.fail(ValidationError::NoFile);
            return None;
        };

        let query = self.table_query.trim();
        let query = (!query.is_empty()).then(|| query.to_string());

        self.start(Action::Upload);
        Some(UploadJob { file, query })
    }

    pub fn begin_chat(&mut self) -> Option<ChatJob> {
        if self.chatting {
            return None;
        }
        let query = self.chat_query.trim();
        if query.is_empty() {
            self.fail(ValidationError::EmptyQuery);
            return None;
        }
        let query = query.to_string();

        self.start(Action::Chat);
        Some(ChatJob { query })
    }

    pub fn finish(&mut self, action: Action, result: Result<String, RequestError>) {
        match action {
            Action::Upload => self.uploading = false,
            Action::Chat => self.chatting = false,
        }

        // Only one of response/error is current; the last finisher owns both.
        match result {
            Ok(text) => {
                self.response = text;
                self.error.clear();
            }
            Err(e) => {
                tracing::warn!(?action, "request failed: {}", e);
                self.response.clear();
                self.error = e.user_message(action);
            }
        }
    }

    pub fn reset(&mut self) {
        self.file = None;
        self.table_query.clear();
        self.chat_query.clear();
        self.response.clear();
        self.error.clear();
    }

    pub fn can_upload(&self) -> bool {
        self.file.is_some() && !self.uploading
    }

    pub fn can_chat(&self) -> bool {
        !self.chat_query.trim().is_empty() && !self.chatting
    }

    pub fn is_uploading(&self) -> bool {
        self.uploading
    }

    pub fn is_chatting(&self) -> bool {
        self.chatting
    }

    pub fn is_loading(&self) -> bool {
        self.uploading || self.chatting
    }

    fn start(&mut self, action: Action) {
        self.response.clear();
        self.error.clear();
        match action {
            Action::Upload => self.uploading = true,
            Action::Chat => self.chatting = true,
        }
    }

    fn fail(&mut self, err: ValidationError) {
        if let ValidationError::DisallowedType { mime } = &err {
            tracing::debug!(%mime, "rejected file type");
        }
        self.error = err.to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn csv() -> SelectedFile {
        SelectedFile::from_path("/tmp/energy.csv")
    }

    #[test]
    fn test_rejects_disallowed_type() {
        let mut form = Form::default();
        form.select_file(csv());
        assert!(form.file.is_some());

        for name in ["notes.txt", "usage.xlsx", "photo.png", "no_extension"] {
            form.select_file(SelectedFile::from_path(name));
            assert!(form.file.is_none(), "{} should be rejected", name);
            assert_eq!(form.error, "Only CSV files are allowed!");
        }
    }

    #[test]
    fn test_accepting_clears_error_and_response() {
        let mut form = Form {
            error: "Please select a file first.".to_string(),
            response: "old".to_string(),
            ..Default::default()
        };
        form.select_file(SelectedFile::from_path("legacy.xls"));
        assert_eq!(form.file.as_ref().map(|f| f.name.as_str()), Some("legacy.xls"));
        assert!(form.error.is_empty());
        assert!(form.response.is_empty());
    }

    #[test]
    fn test_upload_requires_file() {
        let mut form = Form {
            response: "previous".to_string(),
            ..Default::default()
        };
        assert!(!form.can_upload());
        assert!(form.begin_upload().is_none());
        assert_eq!(form.error, "Please select a file first.");
        assert!(!form.is_uploading());
        assert_eq!(form.response, "previous");
    }

    #[test]
    fn test_chat_requires_query() {
        let mut form = Form::default();
        for query in ["", "   ", "\n\t "] {
            form.chat_query = query.to_string();
            assert!(!form.can_chat());
            assert!(form.begin_chat().is_none());
            assert_eq!(form.error, "Please enter a query.");
            assert!(!form.is_chatting());
        }
    }

    #[test]
    fn test_begin_upload_clears_and_trims() {
        let mut form = Form::default();
        form.select_file(csv());
        form.table_query = "  Which appliance uses most energy?  ".to_string();
        form.response = "old".to_string();
        form.error = "old".to_string();

        let job = form.begin_upload().unwrap();
        assert_eq!(job.file, csv());
        assert_eq!(job.query.as_deref(), Some("Which appliance uses most energy?"));
        assert!(form.response.is_empty());
        assert!(form.error.is_empty());
        assert!(form.is_uploading());
        assert!(!form.can_upload());

        // A second trigger while in flight does nothing.
        assert!(form.begin_upload().is_none());
        assert!(form.error.is_empty());
    }

    #[test]
    fn test_blank_table_query_is_omitted() {
        let mut form = Form::default();
        form.select_file(csv());
        form.table_query = "   ".to_string();
        assert_eq!(form.begin_upload().unwrap().query, None);
    }

    #[test]
    fn test_finish_success_and_failure() {
        let mut form = Form::default();
        form.select_file(csv());
        form.begin_upload().unwrap();
        form.finish(Action::Upload, Ok("📊 File Analysis:\nA".to_string()));
        assert!(!form.is_uploading());
        assert_eq!(form.response, "📊 File Analysis:\nA");
        assert!(form.error.is_empty());

        form.chat_query = " hi ".to_string();
        let job = form.begin_chat().unwrap();
        assert_eq!(job.query, "hi");
        assert!(form.response.is_empty());
        form.finish(Action::Chat, Err(RequestError::NoResponse));
        assert!(!form.is_chatting());
        assert!(!form.is_loading());
        assert!(form.response.is_empty());
        assert_eq!(form.error, "No response from server. Please check your connection.");
    }

    #[test]
    fn test_server_error_message() {
        let mut form = Form::default();
        form.select_file(csv());
        form.begin_upload().unwrap();
        form.finish(
            Action::Upload,
            Err(RequestError::Server {
                status: 400,
                message: Some("bad data".to_string()),
            }),
        );
        assert_eq!(form.error, "Upload Error: bad data");
        assert!(!form.is_loading());
    }

    #[test]
    fn test_actions_are_independent() {
        let mut form = Form::default();
        form.select_file(csv());
        form.chat_query = "hello".to_string();

        form.begin_upload().unwrap();
        assert!(form.can_chat());
        form.begin_chat().unwrap();
        assert!(form.is_uploading() && form.is_chatting());

        form.finish(Action::Chat, Ok("chat".to_string()));
        assert!(form.is_uploading());
        assert!(form.is_loading());
        form.finish(Action::Upload, Ok("upload".to_string()));
        assert!(!form.is_loading());
        assert_eq!(form.response, "upload");
    }

    #[test]
    fn test_interleaved_finish_keeps_one_slot() {
        let mut form = Form::default();
        form.select_file(csv());
        form.chat_query = "hello".to_string();

        form.begin_upload().unwrap();
        form.begin_chat().unwrap();
        form.finish(Action::Chat, Err(RequestError::NoResponse));
        form.finish(Action::Upload, Ok("upload ok".to_string()));
        assert_eq!(form.response, "upload ok");
        assert!(form.error.is_empty());

        form.begin_upload().unwrap();
        form.begin_chat().unwrap();
        form.finish(Action::Chat, Ok("chat ok".to_string()));
        form.finish(
            Action::Upload,
            Err(RequestError::Server {
                status: 400,
                message: Some("bad data".to_string()),
            }),
        );
        assert!(form.response.is_empty());
        assert_eq!(form.error, "Upload Error: bad data");
        assert!(!form.is_loading());
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut form = Form::default();
        form.select_file(csv());
        form.table_query = "q1".to_string();
        form.chat_query = "q2".to_string();
        form.response = "r".to_string();
        form.error = "e".to_string();

        form.reset();
        assert!(form.file.is_none());
        assert!(form.table_query.is_empty());
        assert!(form.chat_query.is_empty());
        assert!(form.response.is_empty());
        assert!(form.error.is_empty());
    }
}
