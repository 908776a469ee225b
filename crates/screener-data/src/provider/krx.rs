//! KRX Open API 클라이언트.
//!
//! 한국거래소(KRX) Open API를 통해 종목 목록, 일별 시세, 지수를
//! 수집합니다. AUTH_KEY는 HTTP 헤더로 전달하며 응답은 `OutBlock_1`
//! 배열 형태입니다. 숫자 필드는 쉼표가 포함된 문자열로 내려오므로
//! 파싱 시 제거합니다.
//!
//! # 사용 예제
//!
//! ```rust,ignore
//! use screener_data::provider::KrxClient;
//!
//! let client = KrxClient::from_env()?;
//! let listing = client.fetch_listing().await?;
//! ```

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::{DataError, Result};
use screener_core::Market;

use super::{
    MarketDataProvider, ProviderBar, StockListing, INDEX_KOSDAQ, INDEX_KOSPI,
};

/// KRX Open API 클라이언트.
#[derive(Clone)]
pub struct KrxClient {
    client: reqwest::Client,
    auth_key: String,
    base_url: String,
}

/// API 응답 래퍼.
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    #[serde(rename = "OutBlock_1")]
    out_block: Option<Vec<T>>,
}

/// API 카테고리별 URL 경로.
#[derive(Debug, Clone, Copy)]
enum ApiCategory {
    /// 지수 (idx)
    Index,
    /// 주식 (stk)
    Stock,
}

impl ApiCategory {
    fn path(&self) -> &'static str {
        match self {
            ApiCategory::Index => "idx",
            ApiCategory::Stock => "stk",
        }
    }
}

impl KrxClient {
    /// 새로운 KRX API 클라이언트 생성.
    ///
    /// # Note
    /// 직접 API 키를 하드코딩하지 마세요. `from_env()`를 사용하세요.
    pub fn new(auth_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("HTTP 클라이언트 생성 실패"),
            auth_key: auth_key.into(),
            base_url: "https://data-dbg.krx.co.kr".to_string(),
        }
    }

    /// 환경변수 `KRX_API_KEY`에서 인증키를 로드하여 클라이언트 생성.
    pub fn from_env() -> Result<Self> {
        std::env::var("KRX_API_KEY")
            .map(Self::new)
            .map_err(|_| {
                DataError::ConfigError("KRX_API_KEY 환경변수가 설정되지 않았습니다".to_string())
            })
    }

    /// Base URL 교체 (테스트용).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// API 요청 실행.
    ///
    /// AUTH_KEY는 HTTP 헤더로 전달합니다 (KRX OPEN API 명세 준수).
    async fn request<T: for<'de> Deserialize<'de>>(
        &self,
        category: ApiCategory,
        api_id: &str,
        params: &HashMap<&str, &str>,
    ) -> Result<Vec<T>> {
        let url = format!(
            "{}/svc/sample/apis/{}/{}",
            self.base_url,
            category.path(),
            api_id
        );

        tracing::debug!(api_id = api_id, url = %url, "KRX API 요청");

        let response = self
            .client
            .get(&url)
            .query(params)
            .header("AUTH_KEY", &self.auth_key)
            .header("Accept", "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(DataError::FetchError(format!(
                "KRX API 오류 [{}]: {} - {}",
                api_id, status, body
            )));
        }

        let data: ApiResponse<T> = response.json().await?;

        Ok(data.out_block.unwrap_or_default())
    }

    /// 개별 종목 일별 시세 조회.
    ///
    /// API: stk_isu_ohlcv (주식 카테고리)
    async fn fetch_stock_ohlcv(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ProviderBar>> {
        #[derive(Deserialize)]
        struct RawOhlcv {
            #[serde(rename = "TRD_DD")]
            date: String,
            #[serde(rename = "TDD_OPNPRC", default)]
            open: Option<String>,
            #[serde(rename = "TDD_HGPRC", default)]
            high: Option<String>,
            #[serde(rename = "TDD_LWPRC", default)]
            low: Option<String>,
            #[serde(rename = "TDD_CLSPRC", default)]
            close: Option<String>,
            #[serde(rename = "ACC_TRDVOL", default)]
            volume: Option<String>,
        }

        let start_str = start.format("%Y%m%d").to_string();
        let end_str = end.format("%Y%m%d").to_string();
        let params: HashMap<&str, &str> = [
            ("isuCd", ticker),
            ("strtDd", start_str.as_str()),
            ("endDd", end_str.as_str()),
        ]
        .into_iter()
        .collect();

        let raw: Vec<RawOhlcv> = self.request(ApiCategory::Stock, "stk_isu_ohlcv", &params).await?;

        let mut bars: Vec<ProviderBar> = raw
            .into_iter()
            .filter_map(|o| {
                let date = parse_date(&o.date)?;
                let close = parse_decimal_opt(&o.close)?;
                Some(ProviderBar {
                    date,
                    open: parse_decimal_opt(&o.open).unwrap_or(close),
                    high: parse_decimal_opt(&o.high).unwrap_or(close),
                    low: parse_decimal_opt(&o.low).unwrap_or(close),
                    close,
                    volume: parse_i64_opt(&o.volume).unwrap_or(0),
                    change: None,
                    change_percent: None,
                })
            })
            .collect();

        bars.sort_by_key(|b| b.date);

        tracing::debug!(ticker = ticker, count = bars.len(), "일별 시세 조회 완료");
        Ok(bars)
    }

    /// 헤드라인 지수 하루치 조회.
    ///
    /// API: kospi_dd_trd / kosdaq_dd_trd (지수 카테고리).
    /// 시리즈 전체 중 대표 지수 행(코스피/코스닥)만 추출합니다.
    async fn fetch_index_day(
        &self,
        api_id: &str,
        index_name: &str,
        base_date: NaiveDate,
    ) -> Result<Option<ProviderBar>> {
        #[derive(Deserialize)]
        struct RawIndex {
            #[serde(rename = "BAS_DD")]
            date: String,
            #[serde(rename = "IDX_NM")]
            index_name: String,
            #[serde(rename = "CLSPRC_IDX")]
            close: String,
            #[serde(rename = "CMPPREVDD_IDX", default)]
            change: Option<String>,
            #[serde(rename = "FLUC_RT", default)]
            change_rate: Option<String>,
            #[serde(rename = "OPNPRC_IDX", default)]
            open: Option<String>,
            #[serde(rename = "HGPRC_IDX", default)]
            high: Option<String>,
            #[serde(rename = "LWPRC_IDX", default)]
            low: Option<String>,
            #[serde(rename = "ACC_TRDVOL", default)]
            volume: Option<String>,
        }

        let date_str = base_date.format("%Y%m%d").to_string();
        let params: HashMap<&str, &str> = [("basDd", date_str.as_str())].into_iter().collect();

        let raw: Vec<RawIndex> = self.request(ApiCategory::Index, api_id, &params).await?;

        // 휴장일에는 빈 응답
        let bar = raw
            .into_iter()
            .filter(|i| i.index_name == index_name)
            .find_map(|i| {
                let date = parse_date(&i.date)?;
                let close: Decimal = i.close.replace(',', "").parse().ok()?;
                Some(ProviderBar {
                    date,
                    open: parse_decimal_opt(&i.open).unwrap_or(close),
                    high: parse_decimal_opt(&i.high).unwrap_or(close),
                    low: parse_decimal_opt(&i.low).unwrap_or(close),
                    close,
                    volume: parse_i64_opt(&i.volume).unwrap_or(0),
                    change: parse_decimal_opt(&i.change),
                    change_percent: parse_decimal_opt(&i.change_rate),
                })
            });

        Ok(bar)
    }

    /// 지수 시계열 조회 (일 단위 API를 날짜별로 반복 호출).
    async fn fetch_index_series(
        &self,
        code: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ProviderBar>> {
        let (api_id, index_name) = match code {
            INDEX_KOSPI => ("kospi_dd_trd", "코스피"),
            INDEX_KOSDAQ => ("kosdaq_dd_trd", "코스닥"),
            other => {
                return Err(DataError::InvalidData(format!(
                    "지원하지 않는 지수 코드: {}",
                    other
                )))
            }
        };

        let mut bars = Vec::new();
        let mut date = start;
        while date <= end {
            if let Some(bar) = self.fetch_index_day(api_id, index_name, date).await? {
                bars.push(bar);
            }
            date += Duration::days(1);
        }

        tracing::debug!(code = code, count = bars.len(), "지수 시계열 조회 완료");
        Ok(bars)
    }

    /// 시장별 종목 기본 정보 조회.
    ///
    /// API: stk_isu_base_info / ksq_isu_base_info (주식 카테고리)
    async fn fetch_market_listing(
        &self,
        api_id: &str,
        market: Market,
        base_date: NaiveDate,
    ) -> Result<Vec<StockListing>> {
        #[derive(Deserialize)]
        struct RawStock {
            #[serde(rename = "ISU_SRT_CD")]
            ticker: String,
            #[serde(rename = "ISU_ABBRV")]
            name: String,
            #[serde(rename = "SECT_TP_NM", default)]
            sector: Option<String>,
            #[serde(rename = "MKTCAP", default)]
            market_cap: Option<String>,
        }

        let date_str = base_date.format("%Y%m%d").to_string();
        let params: HashMap<&str, &str> = [("basDd", date_str.as_str())].into_iter().collect();

        let raw: Vec<RawStock> = self.request(ApiCategory::Stock, api_id, &params).await?;

        let listings: Vec<StockListing> = raw
            .into_iter()
            .map(|s| StockListing {
                symbol: s.ticker,
                name: s.name,
                market,
                sector: s.sector,
                market_cap: s
                    .market_cap
                    .as_ref()
                    .and_then(|v| parse_decimal_opt(&Some(v.clone())))
                    .and_then(|d| d.to_i64()),
            })
            .collect();

        tracing::info!(market = %market, count = listings.len(), "종목 목록 조회 완료");
        Ok(listings)
    }
}

#[async_trait]
impl MarketDataProvider for KrxClient {
    async fn fetch_series(
        &self,
        code: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ProviderBar>> {
        if code == INDEX_KOSPI || code == INDEX_KOSDAQ {
            self.fetch_index_series(code, start, end).await
        } else {
            self.fetch_stock_ohlcv(code, start, end).await
        }
    }

    async fn fetch_listing(&self) -> Result<Vec<StockListing>> {
        let today = chrono::Utc::now().date_naive();

        // 병렬로 KOSPI, KOSDAQ 조회
        let (kospi_result, kosdaq_result) = tokio::join!(
            self.fetch_market_listing("stk_isu_base_info", Market::Kospi, today),
            self.fetch_market_listing("ksq_isu_base_info", Market::Kosdaq, today),
        );

        let mut all = kospi_result?;
        all.extend(kosdaq_result?);

        tracing::info!(total = all.len(), "전종목 목록 조회 완료");
        Ok(all)
    }
}

/// 문자열을 Decimal로 파싱 (쉼표/퍼센트 기호 제거).
fn parse_decimal_opt(s: &Option<String>) -> Option<Decimal> {
    s.as_ref().and_then(|v| {
        let cleaned = v.replace(',', "").replace('%', "");
        cleaned.parse().ok()
    })
}

/// 문자열을 i64로 파싱 (쉼표 제거).
fn parse_i64_opt(s: &Option<String>) -> Option<i64> {
    s.as_ref().and_then(|v| v.replace(',', "").parse().ok())
}

/// YYYYMMDD 또는 YYYY/MM/DD 형식의 날짜 파싱.
fn parse_date(s: &str) -> Option<NaiveDate> {
    if s.contains('/') {
        NaiveDate::parse_from_str(s, "%Y/%m/%d").ok()
    } else {
        NaiveDate::parse_from_str(s, "%Y%m%d").ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_decimal() {
        assert_eq!(
            parse_decimal_opt(&Some("1,234.56".to_string())),
            Some(Decimal::new(123456, 2))
        );
        assert_eq!(
            parse_decimal_opt(&Some("12.34%".to_string())),
            Some(Decimal::new(1234, 2))
        );
        assert_eq!(parse_decimal_opt(&None), None);
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        assert_eq!(parse_date("20240315"), Some(expected));
        assert_eq!(parse_date("2024/03/15"), Some(expected));
        assert_eq!(parse_date("invalid"), None);
    }

    #[tokio::test]
    async fn test_fetch_stock_ohlcv_parses_response() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/svc/sample/apis/stk/stk_isu_ohlcv")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                    "OutBlock_1": [
                        {
                            "TRD_DD": "2024/03/15",
                            "TDD_OPNPRC": "71,000",
                            "TDD_HGPRC": "72,500",
                            "TDD_LWPRC": "70,800",
                            "TDD_CLSPRC": "72,000",
                            "ACC_TRDVOL": "12,345,678"
                        },
                        {
                            "TRD_DD": "2024/03/14",
                            "TDD_OPNPRC": "70,500",
                            "TDD_HGPRC": "71,200",
                            "TDD_LWPRC": "70,100",
                            "TDD_CLSPRC": "71,000",
                            "ACC_TRDVOL": "9,876,543"
                        }
                    ]
                }"#,
            )
            .create_async()
            .await;

        let client = KrxClient::new("test-key").with_base_url(server.url());
        let start = NaiveDate::from_ymd_opt(2024, 3, 14).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();

        let bars = client.fetch_series("005930", start, end).await.unwrap();

        mock.assert_async().await;
        assert_eq!(bars.len(), 2);

        // 날짜 오름차순으로 정렬
        assert_eq!(bars[0].date, start);
        assert_eq!(bars[1].date, end);
        assert_eq!(bars[1].close, Decimal::from(72_000));
        assert_eq!(bars[1].volume, 12_345_678);
    }

    #[tokio::test]
    async fn test_fetch_series_empty_out_block() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/svc/sample/apis/stk/stk_isu_ohlcv")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"OutBlock_1": []}"#)
            .create_async()
            .await;

        let client = KrxClient::new("test-key").with_base_url(server.url());
        let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();

        let bars = client.fetch_series("005930", date, date).await.unwrap();
        assert!(bars.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_series_http_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/svc/sample/apis/stk/stk_isu_ohlcv")
            .match_query(mockito::Matcher::Any)
            .with_status(401)
            .with_body("unauthorized")
            .create_async()
            .await;

        let client = KrxClient::new("bad-key").with_base_url(server.url());
        let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();

        let result = client.fetch_series("005930", date, date).await;
        assert!(matches!(result, Err(DataError::FetchError(_))));
    }

    #[tokio::test]
    async fn test_fetch_index_day_picks_headline_row() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/svc/sample/apis/idx/kospi_dd_trd")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                    "OutBlock_1": [
                        {
                            "BAS_DD": "20240315",
                            "IDX_NM": "코스피 200",
                            "CLSPRC_IDX": "360.50",
                            "CMPPREVDD_IDX": "1.20",
                            "FLUC_RT": "0.33"
                        },
                        {
                            "BAS_DD": "20240315",
                            "IDX_NM": "코스피",
                            "CLSPRC_IDX": "2,666.84",
                            "CMPPREVDD_IDX": "25.19",
                            "FLUC_RT": "0.95",
                            "ACC_TRDVOL": "500,000"
                        }
                    ]
                }"#,
            )
            .create_async()
            .await;

        let client = KrxClient::new("test-key").with_base_url(server.url());
        let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();

        let bars = client.fetch_series(INDEX_KOSPI, date, date).await.unwrap();

        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].close, Decimal::new(266684, 2));
        assert_eq!(bars[0].change_percent, Some(Decimal::new(95, 2)));
    }
}
