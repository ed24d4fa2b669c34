//! 기업 개요 및 재무제표 동기화 모듈 (AlphaVantage).
//!
//! 심볼별로 기업 개요 → 손익계산서 → 재무상태표 → 현금흐름표 순서로
//! 수집합니다. 기업 개요를 먼저 수집해야 CSV 내보내기의
//! 거래소/산업 폴더 경로를 결정할 수 있습니다.

use crate::{CollectionStats, CollectorConfig, Result};
use findata_data::{
    AlphaVantageClient, CompanyRepository, CsvExporter, Database, FinancialsRepository,
};
use sqlx::PgPool;
use std::time::Instant;

/// 기업 개요 + 재무제표 동기화
pub async fn sync_financials(
    pool: &PgPool,
    config: &CollectorConfig,
    symbols: Option<String>,
) -> Result<CollectionStats> {
    let start = Instant::now();
    let mut stats = CollectionStats::new();

    tracing::info!("재무제표 동기화 시작");

    let api_key = config.alphavantage.api_key.as_deref().ok_or_else(|| {
        crate::error::CollectorError::Config(
            "ALPHAVANTAGE_API_KEY 환경변수가 설정되지 않았습니다".to_string(),
        )
    })?;

    let target_symbols =
        super::resolve_target_symbols(pool, symbols, &config.stock_symbols).await?;

    if target_symbols.is_empty() {
        tracing::warn!("동기화할 심볼이 없습니다");
        stats.elapsed = start.elapsed();
        return Ok(stats);
    }

    let client = AlphaVantageClient::new(api_key);
    let db = Database::from_pool(pool.clone());
    let company_repo = CompanyRepository::new(db.clone());
    let financials_repo = FinancialsRepository::new(db);
    let exporter = CsvExporter::new(&config.csv.base_dir);
    let delay = config.alphavantage.request_delay();

    for (idx, symbol) in target_symbols.iter().enumerate() {
        stats.total += 1;
        let mut symbol_rows = 0usize;
        let mut symbol_errors = 0usize;

        tracing::info!(
            symbol = symbol.as_str(),
            progress = format!("{}/{}", idx + 1, target_symbols.len()),
            "심볼 동기화 시작"
        );

        // 1. 기업 개요 (CSV 폴더 경로에 쓰일 거래소/산업 정보 확보)
        match client.fetch_company_overview(symbol).await {
            Ok(Some(profile)) => {
                company_repo.upsert(&profile).await?;
                if config.csv.enabled {
                    if let Err(e) = exporter.export_company_profile(&profile) {
                        tracing::warn!(symbol = symbol.as_str(), error = %e, "기업 개요 CSV 실패");
                    }
                }
            }
            Ok(None) => {
                tracing::warn!(symbol = symbol.as_str(), "기업 개요 없음");
            }
            Err(e) => {
                symbol_errors += 1;
                tracing::error!(symbol = symbol.as_str(), error = %e, "기업 개요 조회 실패");
            }
        }
        tokio::time::sleep(delay).await;

        // CSV 폴더 결정용 기업 정보
        let (exchange, industry) = company_repo
            .get(symbol)
            .await?
            .map(|c| (c.exchange, c.industry))
            .unwrap_or((None, None));

        // 2. 손익계산서
        match client.fetch_income_statements(symbol).await {
            Ok(statements) if !statements.is_empty() => {
                symbol_rows += financials_repo.upsert_income_statements(&statements).await?;
                if config.csv.enabled {
                    if let Err(e) = exporter.export_statements(
                        exchange.as_deref(),
                        industry.as_deref(),
                        symbol,
                        "income",
                        &statements,
                    ) {
                        tracing::warn!(symbol = symbol.as_str(), error = %e, "손익계산서 CSV 실패");
                    }
                }
            }
            Ok(_) => tracing::warn!(symbol = symbol.as_str(), "손익계산서 데이터 없음"),
            Err(e) => {
                symbol_errors += 1;
                tracing::error!(symbol = symbol.as_str(), error = %e, "손익계산서 조회 실패");
            }
        }
        tokio::time::sleep(delay).await;

        // 3. 재무상태표
        match client.fetch_balance_sheets(symbol).await {
            Ok(statements) if !statements.is_empty() => {
                symbol_rows += financials_repo.upsert_balance_sheets(&statements).await?;
                if config.csv.enabled {
                    if let Err(e) = exporter.export_statements(
                        exchange.as_deref(),
                        industry.as_deref(),
                        symbol,
                        "balance",
                        &statements,
                    ) {
                        tracing::warn!(symbol = symbol.as_str(), error = %e, "재무상태표 CSV 실패");
                    }
                }
            }
            Ok(_) => tracing::warn!(symbol = symbol.as_str(), "재무상태표 데이터 없음"),
            Err(e) => {
                symbol_errors += 1;
                tracing::error!(symbol = symbol.as_str(), error = %e, "재무상태표 조회 실패");
            }
        }
        tokio::time::sleep(delay).await;

        // 4. 현금흐름표
        match client.fetch_cash_flows(symbol).await {
            Ok(statements) if !statements.is_empty() => {
                symbol_rows += financials_repo.upsert_cash_flows(&statements).await?;
                if config.csv.enabled {
                    if let Err(e) = exporter.export_statements(
                        exchange.as_deref(),
                        industry.as_deref(),
                        symbol,
                        "cashflow",
                        &statements,
                    ) {
                        tracing::warn!(symbol = symbol.as_str(), error = %e, "현금흐름표 CSV 실패");
                    }
                }
            }
            Ok(_) => tracing::warn!(symbol = symbol.as_str(), "현금흐름표 데이터 없음"),
            Err(e) => {
                symbol_errors += 1;
                tracing::error!(symbol = symbol.as_str(), error = %e, "현금흐름표 조회 실패");
            }
        }
        tokio::time::sleep(delay).await;

        stats.total_rows += symbol_rows;
        if symbol_errors == 0 && symbol_rows > 0 {
            stats.success += 1;
        } else if symbol_rows == 0 && symbol_errors == 0 {
            stats.empty += 1;
        } else {
            stats.errors += 1;
        }

        tracing::info!(
            symbol = symbol.as_str(),
            rows = symbol_rows,
            errors = symbol_errors,
            "심볼 동기화 완료"
        );
    }

    stats.elapsed = start.elapsed();
    Ok(stats)
}
