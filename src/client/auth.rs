use crate::{
    auth::{
        requests::{LoginRequest, RegisterRequest},
        Session,
    },
    client::{api::AuthApi, error::WorkflowError},
};

/// Registration and login. The logged-in session is held here and handed
/// to whoever needs it; nothing is stored globally.
pub struct AuthWorkflow<A> {
    api: A,
    session: Option<Session>,
    error: Option<String>,
}

impl<A: AuthApi> AuthWorkflow<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            session: None,
            error: None,
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn fail(&mut self, action: &str, err: WorkflowError) -> WorkflowError {
        tracing::warn!(action, "{}", err);
        self.error = Some(err.to_string());
        err
    }

    /// Returns the new user's id. Blank fields and mismatched passwords are
    /// rejected without contacting the server.
    pub async fn register(&mut self, form: &RegisterRequest) -> Result<i32, WorkflowError> {
        self.error = None;
        if let Err(err) = form.validate() {
            return Err(self.fail("register", WorkflowError::validation(err)));
        }
        match self.api.register(form).await {
            Ok(user_id) => Ok(user_id),
            Err(err) => Err(self.fail("register", err)),
        }
    }

    pub async fn login(&mut self, username: &str, password: &str) -> Result<&Session, WorkflowError> {
        self.error = None;
        if username.trim().is_empty() || password.is_empty() {
            let err = WorkflowError::validation(crate::utils::REQUIRED_FIELDS_MSG);
            return Err(self.fail("login", err));
        }
        let form = LoginRequest {
            username: username.trim().to_string(),
            password: password.to_string(),
        };
        match self.api.login(&form).await {
            Ok(session) => {
                tracing::info!(user_id = session.user_id, role = %session.role, "logged in");
                Ok(self.session.insert(session))
            }
            Err(err) => Err(self.fail("login", err)),
        }
    }

    /// Forgets the session even if the server call fails.
    pub async fn logout(&mut self) -> Result<(), WorkflowError> {
        let session = match self.session.take() {
            Some(session) => session,
            None => return Ok(()),
        };
        match self.api.logout(&session).await {
            Ok(()) => Ok(()),
            Err(err) => Err(self.fail("logout", err)),
        }
    }
}
