//! reqwestによる解析サービスへのアップロード
//!
//! 送信ボディはチャンク単位のストリームにして、送った分だけ進捗イベントを流す。
//! 進捗と完了は同じチャネルに順番に積まれるので、完了後に進捗が届くことはない。

use crate::error::{Result, TraceLensError};
use futures::StreamExt;
use reqwest::multipart::{Form, Part};
use std::time::Duration;
use tokio::sync::mpsc;
use tracelens_common::{
    analyze_url, interpret_response, AnalysisReport, AnalysisTransport, FileMeta, UploadError,
    FILE_FIELD,
};

/// 1回に送るチャンクサイズ
const CHUNK_SIZE: usize = 64 * 1024;

enum TransferEvent {
    Progress(u64, u64),
    Done(std::result::Result<(u16, String), reqwest::Error>),
}

pub struct ReqwestTransport {
    client: reqwest::Client,
    endpoint: String,
    timeout: Duration,
}

impl ReqwestTransport {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TraceLensError::Http(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: analyze_url(base_url),
            timeout,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn transport_error(&self, err: reqwest::Error) -> UploadError {
        if err.is_timeout() {
            UploadError::Transport(format!("request timed out after {:?}", self.timeout))
        } else {
            UploadError::Transport(err.to_string())
        }
    }
}

impl AnalysisTransport for ReqwestTransport {
    type Payload = Vec<u8>;

    async fn upload(
        &self,
        file: &FileMeta,
        mime_type: &str,
        payload: Vec<u8>,
        on_progress: &mut dyn FnMut(u64, u64),
    ) -> std::result::Result<AnalysisReport, UploadError> {
        let total = payload.len() as u64;
        let (tx, mut rx) = mpsc::unbounded_channel();

        let chunks: Vec<Vec<u8>> = payload.chunks(CHUNK_SIZE).map(<[u8]>::to_vec).collect();
        let progress_tx = tx.clone();
        let mut sent = 0u64;
        let body = futures::stream::iter(chunks).map(move |chunk| {
            sent += chunk.len() as u64;
            let _ = progress_tx.send(TransferEvent::Progress(sent, total));
            Ok::<_, std::io::Error>(chunk)
        });

        let part = Part::stream_with_length(reqwest::Body::wrap_stream(body), total)
            .file_name(file.name.clone())
            .mime_str(mime_type)
            .map_err(|e| UploadError::Transport(e.to_string()))?;
        let form = Form::new().part(FILE_FIELD, part);

        tracing::debug!(endpoint = %self.endpoint, bytes = total, "sending multipart request");
        let request = self.client.post(&self.endpoint).multipart(form);

        tokio::spawn(async move {
            let result = async {
                let response = request.send().await?;
                let status = response.status().as_u16();
                let body = response.text().await?;
                Ok::<_, reqwest::Error>((status, body))
            }
            .await;
            let _ = tx.send(TransferEvent::Done(result));
        });

        while let Some(event) = rx.recv().await {
            match event {
                TransferEvent::Progress(loaded, total) => on_progress(loaded, total),
                TransferEvent::Done(Ok((status, body))) => {
                    tracing::debug!(status, bytes = body.len(), "analysis response received");
                    return interpret_response(status, &body);
                }
                TransferEvent::Done(Err(err)) => return Err(self.transport_error(err)),
            }
        }

        Err(UploadError::Transport(
            "upload task ended without a response".into(),
        ))
    }
}
