use anyhow::Context;

use medreport::api::{start_server, ApiContext};
use medreport::config::{Config, APP_VERSION};
use medreport::db::Store;
use medreport::pipeline::{
    sweep_orphans, Decoder, ExtractionPipeline, OcrEngine, OllamaClient, PdfiumRenderer,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    medreport::init_tracing();

    let config = Config::from_env()?;
    tracing::info!("medreport starting v{APP_VERSION}");

    // Clear staging files orphaned by a previous crash before serving.
    sweep_orphans(&config.staging_dir);

    let store = Store::open(&config.db_path)
        .with_context(|| format!("Failed to open database at {}", config.db_path.display()))?;

    let renderer =
        PdfiumRenderer::new().context("PDFium library is required for PDF uploads")?;
    let ocr = build_ocr_engine(&config)?;
    let completion = Box::new(OllamaClient::new(&config.completion));
    let pipeline = ExtractionPipeline::new(
        Decoder::new(Box::new(renderer), config.render_dpi),
        ocr,
        completion,
    );

    let ctx = ApiContext::new(store, pipeline, config.staging_dir.clone());
    let mut server = start_server(ctx, config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;
    tracing::info!("Shutdown signal received");

    server.shutdown();
    server.join().await;
    Ok(())
}

#[cfg(feature = "ocr")]
fn build_ocr_engine(config: &Config) -> anyhow::Result<Box<dyn OcrEngine>> {
    use medreport::pipeline::TesseractOcr;
    let engine = TesseractOcr::new(&config.tessdata_dir).with_context(|| {
        format!(
            "Tesseract language data not found at {}",
            config.tessdata_dir.display()
        )
    })?;
    Ok(Box::new(engine))
}

#[cfg(not(feature = "ocr"))]
fn build_ocr_engine(_config: &Config) -> anyhow::Result<Box<dyn OcrEngine>> {
    anyhow::bail!("this binary was built without the `ocr` feature; rebuild with `--features ocr`")
}
