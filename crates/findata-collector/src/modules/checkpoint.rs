//! 워크플로우 체크포인트 관리 모듈.
//!
//! 장시간 실행되는 배치 작업의 중단/재개를 지원합니다.
//!
//! # 주요 기능
//!
//! - **체크포인트 저장**: 처리 단위마다 진행 상태 저장
//! - **중단점 재개**: 중단된 지점부터 이어서 처리
//!
//! # 사용 예
//!
//! ```rust,ignore
//! // 워크플로우 시작 시
//! let resume_item = if resume {
//!     load_checkpoint(pool, "worldbank_sync").await?
//! } else {
//!     None
//! };
//!
//! // 처리 중 (단위마다)
//! save_checkpoint(pool, "worldbank_sync", &country, processed, CheckpointStatus::Running).await?;
//!
//! // 완료 시
//! save_checkpoint(pool, "worldbank_sync", "", total, CheckpointStatus::Completed).await?;
//! ```

use sqlx::PgPool;

use crate::Result;

/// 체크포인트 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckpointStatus {
    /// 실행 중
    Running,
    /// 중단됨 (재개 가능)
    Interrupted,
    /// 완료됨
    Completed,
    /// 유휴 상태
    Idle,
}

impl CheckpointStatus {
    /// 문자열로 변환
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Interrupted => "interrupted",
            Self::Completed => "completed",
            Self::Idle => "idle",
        }
    }
}

/// 체크포인트 저장.
///
/// # Arguments
/// * `pool` - DB 연결 풀
/// * `workflow` - 워크플로우 이름 (e.g., "worldbank_sync")
/// * `item` - 마지막 처리된 항목 (완료 시 빈 문자열)
/// * `total_processed` - 총 처리된 수
/// * `status` - 현재 상태
pub async fn save_checkpoint(
    pool: &PgPool,
    workflow: &str,
    item: &str,
    total_processed: i32,
    status: CheckpointStatus,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO collect_checkpoint (workflow_name, last_item, last_processed_at, total_processed, status, updated_at)
        VALUES ($1, $2, NOW(), $3, $4, NOW())
        ON CONFLICT (workflow_name)
        DO UPDATE SET
            last_item = EXCLUDED.last_item,
            last_processed_at = NOW(),
            total_processed = EXCLUDED.total_processed,
            status = EXCLUDED.status,
            updated_at = NOW()
        "#,
    )
    .bind(workflow)
    .bind(item)
    .bind(total_processed)
    .bind(status.as_str())
    .execute(pool)
    .await?;
    Ok(())
}

/// 체크포인트 로드 (재개 가능한 워크플로우의 마지막 항목 반환).
///
/// 프로세스가 강제 종료되면 상태가 'running'으로 남으므로
/// 'interrupted'와 'running' 모두 재개 대상으로 봅니다.
///
/// # Returns
/// * `Some(item)` - 중단된 지점의 마지막 항목
/// * `None` - 중단점이 없거나 완료된 상태
pub async fn load_checkpoint(pool: &PgPool, workflow: &str) -> Result<Option<String>> {
    let result: Option<(Option<String>,)> = sqlx::query_as(
        r#"
        SELECT last_item
        FROM collect_checkpoint
        WHERE workflow_name = $1 AND status IN ('interrupted', 'running')
        "#,
    )
    .bind(workflow)
    .fetch_optional(pool)
    .await?;

    Ok(result.and_then(|(item,)| item.filter(|i| !i.is_empty())))
}

/// 현재 실행 중인 워크플로우를 "interrupted"로 마킹.
pub async fn mark_interrupted(pool: &PgPool, workflow: &str) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE collect_checkpoint
        SET status = 'interrupted', updated_at = NOW()
        WHERE workflow_name = $1 AND status = 'running'
        "#,
    )
    .bind(workflow)
    .execute(pool)
    .await?;
    Ok(())
}

/// 워크플로우 체크포인트 삭제 (완전 초기화).
pub async fn clear_checkpoint(pool: &PgPool, workflow: &str) -> Result<()> {
    sqlx::query(
        r#"
        DELETE FROM collect_checkpoint
        WHERE workflow_name = $1
        "#,
    )
    .bind(workflow)
    .execute(pool)
    .await?;
    Ok(())
}

/// 모든 워크플로우의 체크포인트 상태 조회.
pub async fn list_checkpoints(pool: &PgPool) -> Result<Vec<CheckpointInfo>> {
    let rows: Vec<(
        String,
        Option<String>,
        Option<chrono::DateTime<chrono::Utc>>,
        i32,
        String,
    )> = sqlx::query_as(
        r#"
        SELECT workflow_name, last_item, last_processed_at, total_processed, status
        FROM collect_checkpoint
        ORDER BY workflow_name
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(
            |(workflow_name, last_item, last_processed_at, total_processed, status)| {
                CheckpointInfo {
                    workflow_name,
                    last_item,
                    last_processed_at,
                    total_processed,
                    status,
                }
            },
        )
        .collect())
}

/// 체크포인트 정보
#[derive(Debug)]
pub struct CheckpointInfo {
    pub workflow_name: String,
    pub last_item: Option<String>,
    pub last_processed_at: Option<chrono::DateTime<chrono::Utc>>,
    pub total_processed: i32,
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checkpoint_status_as_str() {
        assert_eq!(CheckpointStatus::Running.as_str(), "running");
        assert_eq!(CheckpointStatus::Interrupted.as_str(), "interrupted");
        assert_eq!(CheckpointStatus::Completed.as_str(), "completed");
        assert_eq!(CheckpointStatus::Idle.as_str(), "idle");
    }
}
