//! Session commands: register, login, logout, whoami.

use spokeshop_storefront::RegistrationForm;

/// Register a new shopper account.
pub async fn register(
    username: &str,
    password: &str,
    phone: &str,
    age: u32,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut app = super::storefront()?;
    let form = RegistrationForm {
        username: username.to_owned(),
        password: password.to_owned(),
        confirm_password: password.to_owned(),
        phone: phone.to_owned(),
        age,
    };
    app.register(&form).await?;
    tracing::info!("Account registered. Log in with: spoke auth login -u {username} -p <password>");
    Ok(())
}

/// Log in and persist the session file.
pub async fn login(username: &str, password: &str) -> Result<(), Box<dyn std::error::Error>> {
    let mut app = super::storefront()?;
    let user = app.login(username, password).await?;
    tracing::info!("Logged in as {} ({})", user.username, user.role);
    Ok(())
}

/// Log out and clear the session file.
pub fn logout() -> Result<(), Box<dyn std::error::Error>> {
    let mut app = super::storefront()?;
    app.logout()?;
    tracing::info!("Logged out");
    Ok(())
}

/// Show the logged-in user, if any.
pub fn whoami() -> Result<(), Box<dyn std::error::Error>> {
    let app = super::storefront()?;
    match app.current_user() {
        Some(user) => {
            println!("{} ({})", user.username, user.role);
            if let Some(phone) = user.phone {
                println!("phone: {phone}");
            }
        }
        None => println!("not logged in"),
    }
    Ok(())
}
