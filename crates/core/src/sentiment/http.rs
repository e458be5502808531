use crate::config::Settings;
use crate::domain::news::SentimentLabel;
use crate::error::PipelineError;
use crate::sentiment::{Classification, TextClassifier};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const BACKEND: &str = "http";

/// Client for a Hugging Face–style text-classification inference endpoint.
///
/// The whole batch goes out in one `POST {base_url}/models/{model}`; nothing is retried.
#[derive(Debug, Clone)]
pub struct HttpClassifier {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl HttpClassifier {
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let base_url = settings
            .require_classifier_base_url()
            .map_err(|e| PipelineError::unavailable(BACKEND, "load", format!("{e:#}")))?
            .to_string();

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.classifier_timeout_secs))
            .build()
            .map_err(|e| PipelineError::unavailable(BACKEND, "load", e.to_string()))?;

        Ok(Self {
            http,
            base_url,
            model: settings.classifier_model.clone(),
            api_key: settings.classifier_api_key.clone(),
        })
    }

    fn url(&self) -> String {
        format!(
            "{}/models/{}",
            self.base_url.trim_end_matches('/'),
            self.model.trim_start_matches('/')
        )
    }

    fn headers(&self) -> anyhow::Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        if let Some(api_key) = &self.api_key {
            let value = HeaderValue::from_str(&format!("Bearer {api_key}"))
                .map_err(|e| PipelineError::unavailable(BACKEND, "load", e.to_string()))?;
            headers.insert(AUTHORIZATION, value);
        }
        Ok(headers)
    }
}

#[async_trait::async_trait]
impl TextClassifier for HttpClassifier {
    fn backend_name(&self) -> &'static str {
        BACKEND
    }

    async fn classify_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Classification>> {
        let req = InferenceRequest {
            inputs: texts,
            parameters: InferenceParameters { truncation: true },
            options: InferenceOptions {
                wait_for_model: true,
            },
        };

        let res = self
            .http
            .post(self.url())
            .headers(self.headers()?)
            .json(&req)
            .send()
            .await
            .map_err(|e| PipelineError::unavailable(BACKEND, "invoke", e.to_string()))?;

        let status = res.status();
        let text = res
            .text()
            .await
            .map_err(|e| PipelineError::unavailable(BACKEND, "invoke", e.to_string()))?;
        if !status.is_success() {
            return Err(PipelineError::unavailable(
                BACKEND,
                "http",
                format!("status={status} body={text}"),
            )
            .into());
        }

        let out = parse_response(&text)?;
        tracing::debug!(model = %self.model, results = out.len(), "classifier response decoded");
        Ok(out)
    }
}

#[derive(Debug, Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a [String],
    parameters: InferenceParameters,
    options: InferenceOptions,
}

#[derive(Debug, Serialize)]
struct InferenceParameters {
    truncation: bool,
}

#[derive(Debug, Serialize)]
struct InferenceOptions {
    wait_for_model: bool,
}

#[derive(Debug, Clone, Deserialize)]
struct LabelScore {
    label: String,
    score: f64,
}

/// Servers answer either with all label scores per input or with only the top one.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum InputResult {
    TopK(Vec<LabelScore>),
    Top(LabelScore),
}

fn parse_response(text: &str) -> anyhow::Result<Vec<Classification>> {
    let parsed = serde_json::from_str::<Vec<InputResult>>(text).map_err(|e| {
        PipelineError::unavailable(BACKEND, "decode", format!("{e}: {text}"))
    })?;

    parsed
        .into_iter()
        .enumerate()
        .map(|(i, r)| -> anyhow::Result<Classification> {
            let best = match r {
                InputResult::Top(ls) => Some(ls),
                InputResult::TopK(all) => all.into_iter().max_by(|a, b| a.score.total_cmp(&b.score)),
            };
            let best = best.ok_or_else(|| {
                PipelineError::unavailable(BACKEND, "decode", format!("no labels for input {i}"))
            })?;
            Ok(Classification::new(SentimentLabel::parse(&best.label), best.score))
        })
        .collect()
}
