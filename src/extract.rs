//! Request orchestration: URL in, [`ProcessingResult`] out.
//!
//! ```text
//! received → downloading → type-detection → converting
//!          → invoking-model (per unit, sequential) → aggregating → responded
//! ```
//!
//! Download, dispatch and conversion failures abort with a [`MenuError`].
//! Per-unit model failures never do; see [`crate::pipeline::aggregate`].

use crate::config::ServiceConfig;
use crate::error::MenuError;
use crate::output::{round2, ExtractionData, Metrics, ProcessingResult};
use crate::pipeline::aggregate::{process_units, Aggregate};
use crate::pipeline::detect::{self, DocumentKind};
use crate::pipeline::input::{self, FetchedDocument};
use crate::pipeline::llm::{ContentModel, LlmContentModel};
use crate::pipeline::units::{convert_document, ConvertedDocument};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Everything needed to serve extraction requests, built once at start-up.
///
/// Cheap to share: hold it in an `Arc` and call it from any number of tasks.
pub struct MenuExtractor {
    config: Arc<ServiceConfig>,
    model: Arc<dyn ContentModel>,
    http: reqwest::Client,
}

impl MenuExtractor {
    /// Build an extractor whose model is resolved from `config`.
    pub fn new(config: ServiceConfig) -> Result<Self, MenuError> {
        let model = LlmContentModel::from_config(&config)?;
        Self::with_model(config, Arc::new(model))
    }

    /// Build an extractor around an existing model implementation.
    pub fn with_model(config: ServiceConfig, model: Arc<dyn ContentModel>) -> Result<Self, MenuError> {
        let http = input::build_client(&config)?;
        Ok(Self {
            config: Arc::new(config),
            model,
            http,
        })
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Download the document at `url` and extract its menu items.
    ///
    /// `timeout_secs` bounds the download only; `None` uses
    /// [`ServiceConfig::default_timeout_secs`].
    pub async fn process_url(
        &self,
        url: &str,
        timeout_secs: Option<u64>,
    ) -> Result<ProcessingResult, MenuError> {
        let total_start = Instant::now();
        let timeout = timeout_secs.unwrap_or(self.config.default_timeout_secs);

        let FetchedDocument {
            url,
            bytes,
            content_type,
        } = input::fetch(&self.http, url, timeout).await?;

        let kind = detect::detect(content_type.as_deref(), &url);
        info!("Detected document kind: {:?}", kind);

        self.run(kind, bytes, total_start).await
    }

    /// Extract menu items from a payload the caller already holds.
    ///
    /// `media_type` is classified exactly like a `Content-Type` header.
    pub async fn process_bytes(
        &self,
        bytes: Vec<u8>,
        media_type: &str,
    ) -> Result<ProcessingResult, MenuError> {
        let total_start = Instant::now();
        let kind = DocumentKind::from_media_type(&detect::normalise_media_type(media_type));
        self.run(kind, bytes, total_start).await
    }

    async fn run(
        &self,
        kind: DocumentKind,
        bytes: Vec<u8>,
        total_start: Instant,
    ) -> Result<ProcessingResult, MenuError> {
        let converted = convert_document(kind, bytes, &self.config).await?;
        let aggregate = process_units(self.model.as_ref(), &converted.units).await;

        if !aggregate.failed_units.is_empty() {
            info!(
                "{}/{} units failed and were skipped",
                aggregate.failed_units.len(),
                converted.units.len()
            );
        }

        let result = assemble(converted, aggregate, total_start.elapsed().as_secs_f64());
        info!(
            "Extraction complete: {} items in {}s",
            result.metrics().total_platillos,
            result.metrics().tiempo_total
        );
        Ok(result)
    }
}

/// Build the response envelope. PDF-only metrics appear only for PDFs.
fn assemble(converted: ConvertedDocument, aggregate: Aggregate, total_secs: f64) -> ProcessingResult {
    let Aggregate { items, timings, .. } = aggregate;

    let (total_paginas, tiempo_promedio_pagina, tiempo_conversion_pdf) = match converted.pdf {
        Some(pdf) => (
            Some(pdf.page_count),
            Some(timings.average()),
            Some(round2(pdf.conversion_secs)),
        ),
        None => (None, None, None),
    };

    ProcessingResult::success(ExtractionData {
        metricas: Metrics {
            total_platillos: items.len(),
            tiempo_total: round2(total_secs),
            tiempos_por_pagina: timings,
            total_paginas,
            tiempo_promedio_pagina,
            tiempo_conversion_pdf,
        },
        platillos: items,
    })
}
