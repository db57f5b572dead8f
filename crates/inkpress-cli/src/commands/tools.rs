//! Handlers for the synchronous document tools.
//!
//! Every handler follows the same shape: read the local file, hand it to
//! the [`ToolBackend`] seam, resolve the response to a download link, then
//! render it and optionally pull the bytes down next to the user.

use std::path::Path;

use anyhow::anyhow;
use inkpress_api_models::{FileOperationResponse, WatermarkKind, WatermarkOptions};
use inkpress_client::ToolBackend;
use inkpress_ops::{DownloadLink, InputFile};

use crate::cli::{
    CompressArgs, ConvertArgs, ExtractTextArgs, MergeArgs, OcrArgs, OcrExtractArgs, OutputFormat,
    PagenumberArgs, ProtectArgs, RemoveArgs, RotateArgs, SaveTextArgs, SignArgs, UnlockArgs,
    WatermarkArgs,
};
use crate::client::{AppContext, CliError, CliResult};
use crate::commands::auth::resolve_password;
use crate::output::render_links;

pub(crate) async fn handle_compress(ctx: &AppContext, args: CompressArgs) -> CliResult<()> {
    let file = load_input(&args.file)?;
    let backend: &dyn ToolBackend = &ctx.api;
    let response = backend.compress(&file, args.quality.into()).await?;
    println!(
        "{} (ratio {:.0}%)",
        response.operation.message,
        response.compression_ratio * 100.0
    );
    finish_operation(ctx, &response.operation, args.download.as_deref()).await
}

pub(crate) async fn handle_convert(ctx: &AppContext, args: ConvertArgs) -> CliResult<()> {
    let file = load_input(&args.file)?;
    let backend: &dyn ToolBackend = &ctx.api;
    let response = backend.convert(&file, &args.target_format).await?;
    println!("{}", response.message);
    finish_operation(ctx, &response, args.download.as_deref()).await
}

pub(crate) async fn handle_merge(ctx: &AppContext, args: MergeArgs) -> CliResult<()> {
    let files = args
        .files
        .iter()
        .map(|path| load_input(path))
        .collect::<CliResult<Vec<_>>>()?;
    let backend: &dyn ToolBackend = &ctx.api;
    let response = backend.merge(&files).await?;
    println!(
        "{} ({} files merged)",
        response.operation.message, response.merged_files
    );
    finish_operation(ctx, &response.operation, args.download.as_deref()).await
}

pub(crate) async fn handle_protect(ctx: &AppContext, args: ProtectArgs) -> CliResult<()> {
    let file = load_input(&args.file)?;
    let password = resolve_password(args.password, "Document password: ")?;
    let backend: &dyn ToolBackend = &ctx.api;
    let response = backend.protect(&file, &password).await?;
    println!("{}", response.message);
    finish_operation(ctx, &response, args.download.as_deref()).await
}

pub(crate) async fn handle_unlock(ctx: &AppContext, args: UnlockArgs) -> CliResult<()> {
    let file = load_input(&args.file)?;
    let password = resolve_password(args.password, "Document password: ")?;
    let backend: &dyn ToolBackend = &ctx.api;
    let response = backend.unlock(&file, &password).await?;
    println!("{}", response.message);
    finish_operation(ctx, &response, args.download.as_deref()).await
}

pub(crate) async fn handle_rotate(ctx: &AppContext, args: RotateArgs) -> CliResult<()> {
    let file = load_input(&args.file)?;
    let backend: &dyn ToolBackend = &ctx.api;
    let response = backend.rotate(&file, args.angle.into(), &args.pages).await?;
    println!("{}", response.message);
    finish_operation(ctx, &response, args.download.as_deref()).await
}

pub(crate) async fn handle_watermark(ctx: &AppContext, args: WatermarkArgs) -> CliResult<()> {
    let file = load_input(&args.file)?;

    let kind = match (args.text, &args.image) {
        (Some(content), None) => WatermarkKind::Text { content },
        (None, Some(image_path)) => {
            let image = read_file(image_path)?;
            WatermarkKind::Image {
                filename: file_name_of(image_path)?,
                bytes: image,
            }
        }
        _ => {
            return Err(CliError::validation(
                "specify exactly one of --text or --image",
            ));
        }
    };

    let options = WatermarkOptions {
        kind,
        position: args.position.map(Into::into),
        opacity: args.opacity,
        rotation: args.rotation,
        scale: args.scale,
        text_color: args.color,
        pages: args.pages.map(Into::into),
        custom_pages: args.custom_pages,
    };

    let backend: &dyn ToolBackend = &ctx.api;
    let response = backend.watermark(&file, &options).await?;
    println!("{}", response.message);
    finish_operation(ctx, &response, args.download.as_deref()).await
}

pub(crate) async fn handle_page_numbers(ctx: &AppContext, args: PagenumberArgs) -> CliResult<()> {
    let file = load_input(&args.file)?;
    let backend: &dyn ToolBackend = &ctx.api;
    let response = backend
        .add_page_numbers(&file, &args.position, args.start_number)
        .await?;
    println!("{}", response.message);
    finish_operation(ctx, &response, args.download.as_deref()).await
}

pub(crate) async fn handle_remove_pages(ctx: &AppContext, args: RemoveArgs) -> CliResult<()> {
    let file = load_input(&args.file)?;
    let backend: &dyn ToolBackend = &ctx.api;
    let response = backend.remove_pages(&file, &args.pages).await?;
    println!("{}", response.message);
    finish_operation(ctx, &response, args.download.as_deref()).await
}

pub(crate) async fn handle_sign(ctx: &AppContext, args: SignArgs) -> CliResult<()> {
    let file = load_input(&args.file)?;
    let signature = InputFile::new(file_name_of(&args.signature)?, read_file(&args.signature)?);
    let placement = inkpress_api_models::SignaturePlacement {
        x: args.x,
        y: args.y,
        page: args.page,
    };
    let backend: &dyn ToolBackend = &ctx.api;
    let response = backend.sign(&file, &signature, placement).await?;
    println!("{}", response.message);
    finish_operation(ctx, &response, args.download.as_deref()).await
}

pub(crate) async fn handle_extract_text(ctx: &AppContext, args: ExtractTextArgs) -> CliResult<()> {
    let file = load_input(&args.file)?;
    let backend: &dyn ToolBackend = &ctx.api;
    let response = backend.extract_text(&file).await?;
    println!("session: {}", response.session_id);
    println!("pages: {}", response.page_count);
    println!("edit url: {}", response.edit_url);
    println!();
    println!("{}", response.extracted_text);
    Ok(())
}

pub(crate) async fn handle_save_text(ctx: &AppContext, args: SaveTextArgs) -> CliResult<()> {
    let edited = String::from_utf8(read_file(&args.file)?)
        .map_err(|err| CliError::validation(format!("edited text is not valid UTF-8: {err}")))?;
    let backend: &dyn ToolBackend = &ctx.api;
    let response = backend.save_edited_text(&args.session, &edited).await?;
    println!("{}", response.message);
    finish_operation(ctx, &response, args.download.as_deref()).await
}

pub(crate) async fn handle_ocr(ctx: &AppContext, args: OcrArgs) -> CliResult<()> {
    let file = load_input(&args.file)?;
    let backend: &dyn ToolBackend = &ctx.api;
    let response = backend.ocr(&file, &args.language).await?;
    println!("{}", response.operation.message);
    finish_operation(ctx, &response.operation, args.download.as_deref()).await
}

pub(crate) async fn handle_ocr_extract(ctx: &AppContext, args: OcrExtractArgs) -> CliResult<()> {
    let file = load_input(&args.file)?;
    let backend: &dyn ToolBackend = &ctx.api;
    let response = backend.ocr_extract(&file).await?;
    match response.extracted_text {
        Some(text) => println!("{text}"),
        None => println!("{}", response.operation.message),
    }
    Ok(())
}

/// Read a local document into an upload payload. Type and size checks run
/// later, client-side, before anything is sent.
pub(crate) fn load_input(path: &Path) -> CliResult<InputFile> {
    Ok(InputFile::new(file_name_of(path)?, read_file(path)?))
}

fn read_file(path: &Path) -> CliResult<Vec<u8>> {
    std::fs::read(path)
        .map_err(|err| CliError::failure(anyhow!("failed to read '{}': {err}", path.display())))
}

fn file_name_of(path: &Path) -> CliResult<String> {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(str::to_owned)
        .ok_or_else(|| {
            CliError::validation(format!("'{}' has no usable file name", path.display()))
        })
}

async fn finish_operation(
    ctx: &AppContext,
    response: &FileOperationResponse,
    download: Option<&Path>,
) -> CliResult<()> {
    let backend: &dyn ToolBackend = &ctx.api;
    let link = backend.resolve_operation(response)?;
    deliver(ctx, std::slice::from_ref(&link), download).await
}

/// Render the produced links and, when requested, pull the bytes down into
/// the given directory.
pub(crate) async fn deliver(
    ctx: &AppContext,
    links: &[DownloadLink],
    download: Option<&Path>,
) -> CliResult<()> {
    render_links(links, ctx.output)?;
    let Some(dir) = download else {
        return Ok(());
    };

    std::fs::create_dir_all(dir).map_err(|err| {
        CliError::failure(anyhow!("failed to create '{}': {err}", dir.display()))
    })?;
    for link in links {
        let bytes = ctx.api.download(&link.download_url).await?;
        let target = dir.join(&link.filename);
        std::fs::write(&target, bytes).map_err(|err| {
            CliError::failure(anyhow!("failed to write '{}': {err}", target.display()))
        })?;
        if ctx.output == OutputFormat::Table {
            println!("saved {}", target.display());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::QualityArg;
    use httpmock::prelude::*;
    use inkpress_client::{ApiClient, SessionStore};
    use inkpress_events::EventBus;
    use reqwest::Url;
    use serde_json::json;
    use std::path::PathBuf;

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

    fn write_pdf(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, b"%PDF-1.7 fixture").expect("write fixture");
        path
    }

    fn operation_body(filename: &str) -> serde_json::Value {
        json!({
            "success": true,
            "message": "done",
            "fileUrl": format!("/api/file?folder=outputs&filename=raw-{filename}"),
            "filename": filename,
            "originalName": "input.pdf",
            "fileSize": 1024
        })
    }

    #[tokio::test]
    async fn convert_uploads_and_renders_the_link() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST).path("/api/pdf/convert");
            then.status(200).json_body(operation_body("report.docx"));
        });

        let dir = tempfile::tempdir().expect("temp dir");
        let ctx = context_for(&server, dir.path());
        let file = write_pdf(dir.path(), "report.pdf");

        handle_convert(
            &ctx,
            ConvertArgs {
                file,
                target_format: "docx".into(),
                download: None,
            },
        )
        .await
        .expect("convert succeeds");
        mock.assert();
    }

    #[tokio::test]
    async fn compress_rejects_non_pdf_before_any_request() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST).path("/api/pdf/compress");
            then.status(200).json_body(json!({}));
        });

        let dir = tempfile::tempdir().expect("temp dir");
        let ctx = context_for(&server, dir.path());
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, b"plain text").expect("write fixture");

        let err = handle_compress(
            &ctx,
            CompressArgs {
                file: path,
                quality: QualityArg::Medium,
                download: None,
            },
        )
        .await
        .expect_err("must reject");
        assert_eq!(err.exit_code(), 2);
        mock.assert_calls(0);
    }

    #[tokio::test]
    async fn merge_downloads_the_result_when_asked() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST).path("/api/pdf/merge");
            then.status(200).json_body(json!({
                "success": true,
                "message": "merged",
                "fileUrl": "/api/file?folder=merges&filename=raw-combined.pdf",
                "filename": "combined.pdf",
                "originalName": "a.pdf",
                "fileSize": 4,
                "mergedFiles": 2
            }));
        });
        server.mock(|when, then| {
            when.method(GET)
                .path("/api/file")
                .query_param("folder", "merges")
                .query_param("filename", "combined.pdf");
            then.status(200).body("PDF!");
        });

        let dir = tempfile::tempdir().expect("temp dir");
        let ctx = context_for(&server, dir.path());
        let first = write_pdf(dir.path(), "a.pdf");
        let second = write_pdf(dir.path(), "b.pdf");
        let out = dir.path().join("out");

        handle_merge(
            &ctx,
            MergeArgs {
                files: vec![first, second],
                download: Some(out.clone()),
            },
        )
        .await
        .expect("merge succeeds");

        let saved = std::fs::read(out.join("combined.pdf")).expect("downloaded file");
        assert_eq!(saved, b"PDF!");
    }
}
