//! Registration, login, and session maintenance commands.

use anyhow::anyhow;

use crate::cli::{
    LoginArgs, RegisterArgs, ResetConfirmArgs, ResetPasswordArgs, VerifyEmailArgs,
};
use crate::client::{AppContext, CliError, CliResult};

pub(crate) async fn handle_register(ctx: &AppContext, args: RegisterArgs) -> CliResult<()> {
    let password = resolve_password(args.password, "Password: ")?;
    let response = ctx.api.register(&args.name, &args.email, &password).await?;
    println!("Registered {} ({})", response.user.name, response.user.email);
    Ok(())
}

pub(crate) async fn handle_login(ctx: &AppContext, args: LoginArgs) -> CliResult<()> {
    let password = resolve_password(args.password, "Password: ")?;
    let response = ctx.api.login(&args.email, &password).await?;
    println!("Logged in as {} ({})", response.user.name, response.user.email);
    Ok(())
}

pub(crate) async fn handle_logout(ctx: &AppContext) -> CliResult<()> {
    ctx.require_login()?;
    let response = ctx.api.logout().await?;
    println!("{}", response.message);
    Ok(())
}

pub(crate) async fn handle_validate(ctx: &AppContext) -> CliResult<()> {
    ctx.require_login()?;
    let validation = ctx.api.validate_session().await?;
    if validation.valid {
        let user = ctx
            .api
            .session()
            .user()
            .ok_or_else(|| CliError::failure(anyhow!("profile refresh left no snapshot")))?;
        println!("Session valid for {} (role: {})", user.email, validation.role);
    } else {
        println!("Session is no longer valid");
    }
    Ok(())
}

pub(crate) async fn handle_reset_password(
    ctx: &AppContext,
    args: ResetPasswordArgs,
) -> CliResult<()> {
    let response = ctx.api.request_password_reset(&args.email).await?;
    println!("{}", response.message);
    Ok(())
}

pub(crate) async fn handle_reset_confirm(
    ctx: &AppContext,
    args: ResetConfirmArgs,
) -> CliResult<()> {
    let password = resolve_password(args.password, "New password: ")?;
    let response = ctx.api.confirm_password_reset(&args.token, &password).await?;
    println!("{}", response.message);
    Ok(())
}

pub(crate) async fn handle_verify_email(ctx: &AppContext, args: VerifyEmailArgs) -> CliResult<()> {
    let response = ctx.api.verify_email(args.token.as_deref()).await?;
    println!("{}", response.message);
    Ok(())
}

/// Use the flag value when given, otherwise prompt without echo.
pub(crate) fn resolve_password(flag: Option<String>, prompt: &str) -> CliResult<String> {
    match flag {
        Some(password) => Ok(password),
        None => rpassword::prompt_password(prompt)
            .map_err(|err| CliError::failure(anyhow!("failed to read password: {err}"))),
    }
}
