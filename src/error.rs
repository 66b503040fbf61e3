use thiserror::Error;

/// The two request paths the form can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Upload,
    Chat,
}

impl Action {
    fn title(self) -> &'static str {
        match self {
            Action::Upload => "Upload",
            Action::Chat => "Chat",
        }
    }

    fn noun(self) -> &'static str {
        match self {
            Action::Upload => "upload",
            Action::Chat => "chat",
        }
    }
}

/// Rejected before anything touches the network.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Only CSV files are allowed!")]
    DisallowedType { mime: String },
    #[error("Please select a file first.")]
    NoFile,
    #[error("Please enter a query.")]
    EmptyQuery,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    /// The backend answered with a non-2xx status.
    #[error("server responded with status {status}")]
    Server { status: u16, message: Option<String> },
    /// Sent, but nothing came back (connect failure, timeout, broken body).
    #[error("no response from server")]
    NoResponse,
    /// The request could not be built or sent at all.
    #[error("could not set up request: {0}")]
    Setup(String),
}

impl RequestError {
    pub fn user_message(&self, action: Action) -> String {
        match self {
            RequestError::Server { message, .. } => format!(
                "{} Error: {}",
                action.title(),
                message.as_deref().unwrap_or("Server error")
            ),
            RequestError::NoResponse => {
                "No response from server. Please check your connection.".to_string()
            }
            RequestError::Setup(_) => format!("Error setting up the {} request.", action.noun()),
        }
    }
}
