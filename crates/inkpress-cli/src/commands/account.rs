//! Account, API key, pricing, usage, and health commands.

use inkpress_api_models::{PriceQuery, TrackUsageRequest};

use crate::cli::{
    DepositArgs, KeyCreateArgs, KeyRevokeArgs, PricingCalcArgs, PricingOperationArgs,
    UpdateProfileArgs, UsageTrackArgs, VerifyDepositArgs,
};
use crate::client::{AppContext, CliError, CliResult};
use crate::commands::auth::resolve_password;
use crate::output::{
    render_balance, render_calculation, render_health, render_json, render_keys, render_pricing,
    render_profile, render_usage,
};

pub(crate) async fn handle_profile(ctx: &AppContext) -> CliResult<()> {
    ctx.require_login()?;
    let profile = ctx.api.profile().await?;
    render_profile(&profile, ctx.output)
}

pub(crate) async fn handle_update_profile(
    ctx: &AppContext,
    args: UpdateProfileArgs,
) -> CliResult<()> {
    ctx.require_login()?;
    if args.name.is_none() && args.email.is_none() {
        return Err(CliError::validation(
            "nothing to update (pass --name and/or --email)",
        ));
    }
    let response = ctx
        .api
        .update_profile(args.name.as_deref(), args.email.as_deref())
        .await?;
    println!("{}", response.message);
    Ok(())
}

pub(crate) async fn handle_change_password(ctx: &AppContext) -> CliResult<()> {
    ctx.require_login()?;
    let current = resolve_password(None, "Current password: ")?;
    let new = resolve_password(None, "New password: ")?;
    let response = ctx.api.change_password(&current, &new).await?;
    println!("{}", response.message);
    Ok(())
}

pub(crate) async fn handle_balance(ctx: &AppContext) -> CliResult<()> {
    ctx.require_login()?;
    let balance = ctx.api.balance().await?;
    render_balance(&balance, ctx.output)
}

pub(crate) async fn handle_deposit(ctx: &AppContext, args: DepositArgs) -> CliResult<()> {
    ctx.require_login()?;
    if args.amount <= 0.0 {
        return Err(CliError::validation("deposit amount must be positive"));
    }
    let response = ctx.api.create_deposit(args.amount, &args.currency).await?;
    println!(
        "deposit {} of {:.2} {} is {}",
        response.transaction_id, response.amount, response.currency, response.status
    );
    if let Some(url) = response.payment_url {
        println!("complete the payment at: {url}");
    }
    Ok(())
}

pub(crate) async fn handle_verify_deposit(
    ctx: &AppContext,
    args: VerifyDepositArgs,
) -> CliResult<()> {
    ctx.require_login()?;
    let response = ctx.api.verify_deposit(&args.transaction).await?;
    if response.verified {
        println!("{}", response.message);
    } else {
        println!("not verified yet: {}", response.message);
    }
    Ok(())
}

pub(crate) async fn handle_keys_list(ctx: &AppContext) -> CliResult<()> {
    ctx.require_login()?;
    let list = ctx.api.list_api_keys().await?;
    render_keys(&list, ctx.output)
}

pub(crate) async fn handle_keys_create(ctx: &AppContext, args: KeyCreateArgs) -> CliResult<()> {
    ctx.require_login()?;
    let created = ctx.api.create_api_key(&args.name).await?;
    // The full key material is shown exactly once by the server.
    println!("created key '{}' ({})", created.name, created.id);
    println!("{}", created.key);
    println!("the key was saved to the session file for future requests");
    Ok(())
}

pub(crate) async fn handle_keys_revoke(ctx: &AppContext, args: KeyRevokeArgs) -> CliResult<()> {
    ctx.require_login()?;
    let response = ctx.api.revoke_api_key(&args.id).await?;
    println!("{}", response.message);
    Ok(())
}

pub(crate) async fn handle_pricing_info(ctx: &AppContext) -> CliResult<()> {
    let info = ctx.api.pricing().await?;
    render_pricing(&info, ctx.output)
}

pub(crate) async fn handle_pricing_operation(
    ctx: &AppContext,
    args: PricingOperationArgs,
) -> CliResult<()> {
    let price = ctx.api.operation_price(&args.operation).await?;
    match ctx.output {
        crate::cli::OutputFormat::Json => render_json(&price),
        crate::cli::OutputFormat::Table => {
            println!("{}: {:.4} {}", price.operation, price.cost, price.currency);
            Ok(())
        }
    }
}

pub(crate) async fn handle_pricing_calc(ctx: &AppContext, args: PricingCalcArgs) -> CliResult<()> {
    let operations: Vec<PriceQuery> = args
        .operations
        .into_iter()
        .map(|(operation, count)| PriceQuery { operation, count })
        .collect();
    let calc = ctx.api.calculate_price(&operations).await?;
    render_calculation(&calc, ctx.output)
}

pub(crate) async fn handle_usage_stats(ctx: &AppContext) -> CliResult<()> {
    ctx.require_login()?;
    let stats = ctx.api.usage_statistics().await?;
    render_usage(&stats, ctx.output)
}

pub(crate) async fn handle_usage_track(ctx: &AppContext, args: UsageTrackArgs) -> CliResult<()> {
    ctx.require_login()?;
    let request = TrackUsageRequest {
        operation: args.operation,
        success: args.success,
        file_size: args.file_size,
        processing_time: args.processing_time,
    };
    let response = ctx.api.track_usage(&request).await?;
    println!("{}", response.message);
    Ok(())
}

pub(crate) async fn handle_health(ctx: &AppContext) -> CliResult<()> {
    let health = ctx.api.health().await?;
    render_health(&health, ctx.output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::OutputFormat;
    use httpmock::prelude::*;
    use inkpress_client::{ApiClient, SessionStore};
    use inkpress_events::EventBus;
    use reqwest::Url;
    use serde_json::json;
    use std::path::Path;

    fn context_for(server: &MockServer, dir: &Path) -> AppContext {
        let bus = EventBus::new();
        let session = SessionStore::open(dir.join("session.json"), bus.clone());
        let api = ApiClient::new(
            Url::parse(&server.base_url()).expect("mock URL"),
            session,
        )
        .expect("client");
        AppContext {
            api,
            bus,
            output: OutputFormat::Table,
        }
    }

    #[tokio::test]
    async fn authenticated_commands_refuse_to_run_logged_out() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(GET).path("/api/user/profile");
            then.status(200).json_body(json!({}));
        });

        let dir = tempfile::tempdir().expect("temp dir");
        let ctx = context_for(&server, dir.path());
        let err = handle_profile(&ctx).await.expect_err("must refuse");
        assert!(err.display_message().contains("not logged in"));
        mock.assert_calls(0);
    }

    #[tokio::test]
    async fn public_pricing_needs_no_login() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(GET).path("/api/pricing");
            then.status(200).json_body(json!({
                "operationCost": 0.005,
                "freeOperationsMonthly": 10,
                "customPrices": { "ocr": 0.02 },
                "lastUpdated": "2026-08-01T00:00:00Z",
                "source": "config"
            }));
        });

        let dir = tempfile::tempdir().expect("temp dir");
        let ctx = context_for(&server, dir.path());
        handle_pricing_info(&ctx).await.expect("pricing renders");
        mock.assert();
    }

    #[tokio::test]
    async fn update_profile_requires_a_field() {
        let server = MockServer::start_async().await;
        let dir = tempfile::tempdir().expect("temp dir");
        let ctx = context_for(&server, dir.path());
        ctx.api.session().set_auth_token("tok").expect("token");

        let err = handle_update_profile(
            &ctx,
            UpdateProfileArgs {
                name: None,
                email: None,
            },
        )
        .await
        .expect_err("must refuse");
        assert_eq!(err.exit_code(), 2);
    }
}
