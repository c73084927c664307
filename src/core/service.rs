use crate::core::params::{self, DEFAULT_LIMIT};
use crate::core::rescan::{Rescan, Step};
use crate::domain::model::{PageMeta, PageRequest, PageResult, PhoneRecord, State};
use crate::domain::ports::{NumberClassifier, RowSource};
use crate::utils::error::{AppError, Result};

/// Raw lookup parameters as they arrive from a client. Empty means absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(default)]
pub struct NumberQuery {
    pub page: String,
    pub limit: String,
    pub country: String,
    pub state: String,
}

/// Paginated, filterable lookup over a row source.
///
/// Pages without a state filter map onto a single contiguous range of the row
/// source. Pages with a state filter cannot, because a row's state is only
/// known after classification; those are assembled by re-scanning from the
/// first row (see [`crate::core::rescan`]).
pub struct NumberService<R: RowSource, C: NumberClassifier> {
    rows: R,
    classifier: C,
    default_limit: usize,
}

impl<R: RowSource, C: NumberClassifier> NumberService<R, C> {
    pub fn new(rows: R, classifier: C) -> Self {
        Self {
            rows,
            classifier,
            default_limit: DEFAULT_LIMIT,
        }
    }

    pub fn with_default_limit(mut self, default_limit: usize) -> Self {
        self.default_limit = default_limit;
        self
    }

    pub fn default_limit(&self) -> usize {
        self.default_limit
    }

    /// Routes to one of the four lookups depending on which filters are set.
    pub async fn lookup(&self, query: &NumberQuery) -> Result<PageResult> {
        match (query.country.is_empty(), query.state.is_empty()) {
            (true, true) => self.fetch_page(&query.page, &query.limit).await,
            (false, true) => {
                self.fetch_page_by_country(&query.country, &query.page, &query.limit)
                    .await
            }
            (true, false) => {
                self.fetch_page_by_state(&query.state, &query.page, &query.limit)
                    .await
            }
            (false, false) => {
                self.fetch_page_by_country_and_state(
                    &query.country,
                    &query.state,
                    &query.page,
                    &query.limit,
                )
                .await
            }
        }
    }

    pub async fn fetch_page(&self, page: &str, limit: &str) -> Result<PageResult> {
        let request = params::normalize("", page, limit, self.default_limit)?;
        self.contiguous_page(None, &request).await
    }

    pub async fn fetch_page_by_country(
        &self,
        country: &str,
        page: &str,
        limit: &str,
    ) -> Result<PageResult> {
        let request = params::normalize("", page, limit, self.default_limit)?;
        let code = self.resolve_country(country)?;
        self.contiguous_page(Some(code), &request).await
    }

    pub async fn fetch_page_by_state(
        &self,
        state: &str,
        page: &str,
        limit: &str,
    ) -> Result<PageResult> {
        let (request, state) = self.normalize_with_state(state, page, limit)?;
        self.rescan_page(None, state, &request).await
    }

    pub async fn fetch_page_by_country_and_state(
        &self,
        country: &str,
        state: &str,
        page: &str,
        limit: &str,
    ) -> Result<PageResult> {
        let (request, state) = self.normalize_with_state(state, page, limit)?;
        let code = self.resolve_country(country)?;
        self.rescan_page(Some(code), state, &request).await
    }

    fn normalize_with_state(
        &self,
        state: &str,
        page: &str,
        limit: &str,
    ) -> Result<(PageRequest, State)> {
        let request = params::normalize(state, page, limit, self.default_limit)?;
        let state = request
            .state
            .ok_or_else(|| AppError::bad_request("state filter requires OK or NOK"))?;
        Ok((request, state))
    }

    fn resolve_country(&self, country: &str) -> Result<&str> {
        if country.trim().is_empty() {
            return Err(AppError::bad_request("country must not be empty"));
        }
        self.classifier.calling_code_for(country).inspect_err(|_| {
            tracing::info!(country, "country isn't recognized by the classifier");
        })
    }

    async fn contiguous_page(&self, code: Option<&str>, request: &PageRequest) -> Result<PageResult> {
        let offset = request.offset();
        let mut rows = self.fetch(code, offset, request.limit.saturating_add(1)).await?;

        let mut meta = PageMeta {
            current_page: request.page_token.clone(),
            ..PageMeta::default()
        };

        // one extra row means there is at least one more page
        if rows.len() > request.limit {
            rows.truncate(request.limit);
            meta.has_next = true;
        }
        meta.has_prev = offset >= request.limit;

        let records = rows.iter().map(|raw| self.classify(raw)).collect();
        Ok(PageResult::new(records, meta))
    }

    async fn rescan_page(
        &self,
        code: Option<&str>,
        state: State,
        request: &PageRequest,
    ) -> Result<PageResult> {
        let mut scan = Rescan::new(request.page, request.limit);

        while let Step::Fetch { offset, count } = scan.poll() {
            let rows = self.fetch(code, offset, count).await?;
            scan.feed(rows, |raw| {
                let record = self.classify(&raw);
                (record.state == state).then_some(record)
            });
        }

        tracing::debug!(
            page = request.page,
            phase = ?scan.phase(),
            "state filtered scan finished"
        );

        let outcome = scan.finish();
        let meta = PageMeta {
            current_page: request.page_token.clone(),
            has_next: outcome.has_next,
            has_prev: outcome.has_prev,
        };
        Ok(PageResult::new(outcome.items, meta))
    }

    fn classify(&self, raw: &str) -> PhoneRecord {
        self.classifier.classify(raw).into_record()
    }

    async fn fetch(&self, code: Option<&str>, offset: usize, count: usize) -> Result<Vec<String>> {
        tracing::debug!(calling_code = ?code, offset, count, "fetching rows");

        let rows = match code {
            Some(code) => self.rows.fetch_range_by_calling_code(code, offset, count).await,
            None => self.rows.fetch_range(offset, count).await,
        };

        rows.map_err(|e| {
            tracing::error!(error = %e, offset, count, "row source fetch failed");
            AppError::row_source(e)
        })
    }
}
