//! Signup and login.

use crate::error::Result;
use crate::forms::{FormErrors, LoginForm, SignupForm};
use crate::models::User;
use crate::services::Submission;
use crate::traits::{AuthProvider, BlogRepo};

const USERNAME_TAKEN: &str = "A user with that username already exists.";
pub const BAD_CREDENTIALS: &str =
    "Please enter a correct username and password. Note that both fields may be case-sensitive.";

pub async fn signup(
    repo: &dyn BlogRepo,
    auth: &dyn AuthProvider,
    form: &SignupForm,
) -> Result<Submission<User>> {
    let draft = match form.validate() {
        Ok(draft) => draft,
        Err(errors) => return Ok(Submission::Invalid(errors)),
    };
    if repo.get_user_by_username(&draft.username).await?.is_some() {
        let mut errors = FormErrors::new();
        errors.add("username", USERNAME_TAKEN);
        return Ok(Submission::Invalid(errors));
    }

    let hash = auth.hash_password(&draft.password).await?;
    let user = User::new(draft.username, hash);
    repo.create_user(user.clone()).await?;
    log::info!("registered user {}", user.username);
    Ok(Submission::Saved(user))
}

/// Checks the credentials. `Ok(None)` means they were wrong; the caller
/// shows [`BAD_CREDENTIALS`] without saying which half failed.
pub async fn login(
    repo: &dyn BlogRepo,
    auth: &dyn AuthProvider,
    form: &LoginForm,
) -> Result<Option<User>> {
    if form.validate().is_err() {
        return Ok(None);
    }
    let Some(user) = repo.get_user_by_username(form.username.trim()).await? else {
        return Ok(None);
    };
    if auth.verify_password(&form.password, &user.password_hash).await {
        Ok(Some(user))
    } else {
        log::warn!("failed login for {}", user.username);
        Ok(None)
    }
}
