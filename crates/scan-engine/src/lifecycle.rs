//! 스캔 수명주기 관리
//!
//! 스캔 생성 전 공지 배너 표출, 상태 폴링, 종료 상태 전송을 담당합니다.
//!
//! # 폴링 규칙
//!
//! 완료 스냅샷 하나로는 종료로 인정하지 않습니다. 같은 간격으로 한 번 더
//! 조회해 완료가 두 번 연속 관측되어야 하며, 이때 두 번째 스냅샷이
//! 최종 결과가 됩니다. 서버가 잠시 완료로 보였다가 되돌아가는 경우를
//! 걸러냅니다.

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use harborscan_core::types::{MessageSeverity, ScanContext, ScanStatus, ScanStatusSnapshot};

use crate::api::ScanApi;
use crate::api::dto::StatusBanner;
use crate::error::EngineError;

/// 서비스 공지 배너를 로그로 표출합니다.
///
/// 공지는 안내일 뿐이므로 조회 실패는 경고만 남기고 스캔을 막지
/// 않습니다.
pub async fn surface_banners<A: ScanApi>(api: &A, client_id: &str) {
    let response = match api.get_application_status(client_id).await {
        Ok(response) => response,
        Err(e) => {
            warn!(error = %e, "failed to fetch service status, continuing");
            return;
        }
    };

    if let Some(banner) = response.service_message {
        log_banner("service", &banner);
    }
    if let Some(banner) = response.client_message {
        log_banner("client", &banner);
    }
}

fn log_banner(scope: &str, banner: &StatusBanner) {
    match MessageSeverity::from_str_loose(&banner.severity) {
        Some(MessageSeverity::Error) => error!(scope = %scope, "{}", banner.message),
        Some(MessageSeverity::Warn) => warn!(scope = %scope, "{}", banner.message),
        Some(MessageSeverity::Info) => info!(scope = %scope, "{}", banner.message),
        None => {
            debug!(scope = %scope, severity = %banner.severity, "unrecognized banner severity");
            info!(scope = %scope, "{}", banner.message);
        }
    }
    if let Some(url) = &banner.url {
        let label = banner.link_text.as_deref().unwrap_or("details");
        info!(scope = %scope, "{}: {}", label, url);
    }
}

/// 상태 URL에서 스냅샷 하나를 가져옵니다.
pub async fn fetch_snapshot<A: ScanApi>(
    api: &A,
    status_url: &str,
) -> Result<ScanStatusSnapshot, EngineError> {
    let response = api.get_scan_status(status_url).await?;
    Ok(response.into_snapshot())
}

/// 스캔이 종료 상태가 될 때까지 폴링합니다.
///
/// 취소 토큰이 걸리면 다음 조회 없이 `EngineError::Cancelled`를
/// 반환합니다. 토큰이 없으면 종료 상태까지 기다립니다.
///
/// # Errors
///
/// 상태 조회 실패는 그대로 전파됩니다.
pub async fn wait_for_scan_to_finish<A: ScanApi>(
    api: &A,
    status_url: &str,
    interval: Duration,
    cancel: Option<&CancellationToken>,
) -> Result<ScanStatusSnapshot, EngineError> {
    let mut confirmed = false;

    loop {
        if let Some(token) = cancel {
            if token.is_cancelled() {
                info!("scan wait received shutdown signal");
                return Err(EngineError::Cancelled);
            }
        }

        let snapshot = fetch_snapshot(api, status_url).await?;

        if snapshot.is_complete {
            if confirmed {
                info!(status = %snapshot.status, "scan completion confirmed");
                return Ok(snapshot);
            }
            confirmed = true;
            debug!(status = %snapshot.status, "scan reported complete, confirming");
        } else {
            if confirmed {
                debug!("scan no longer complete, resuming polling");
            }
            confirmed = false;
            debug!(status = %snapshot.status, "scan still in progress");
        }

        sleep_or_cancel(interval, cancel).await?;
    }
}

async fn sleep_or_cancel(
    interval: Duration,
    cancel: Option<&CancellationToken>,
) -> Result<(), EngineError> {
    match cancel {
        Some(token) => {
            tokio::select! {
                _ = tokio::time::sleep(interval) => Ok(()),
                _ = token.cancelled() => {
                    info!("scan wait received shutdown signal");
                    Err(EngineError::Cancelled)
                }
            }
        }
        None => {
            tokio::time::sleep(interval).await;
            Ok(())
        }
    }
}

/// 종료 상태를 서버에 전송합니다.
///
/// 전송 전에 현재 상태를 조회해 이미 완료된 스캔이면 아무것도 하지
/// 않습니다. `Incomplete`/`Error` 전송은 에러 레벨로 함께 기록됩니다.
///
/// # Errors
///
/// 상태 조회 또는 전송 실패 시 `EngineError::Api` 반환
pub async fn update_scan_status<A: ScanApi>(
    api: &A,
    ctx: &ScanContext,
    status: ScanStatus,
    message: &str,
) -> Result<(), EngineError> {
    let current = fetch_snapshot(api, &ctx.scan_status_url).await?;
    if current.is_complete {
        debug!(current = %current.status, "scan already complete, skipping status update");
        return Ok(());
    }

    if matches!(status, ScanStatus::Incomplete | ScanStatus::Error) {
        error!(status = %status, message, "reporting unsuccessful scan status");
    }

    api.update_scan_status(ctx, status, message).await?;
    info!(status = %status, "scan status updated");
    Ok(())
}
