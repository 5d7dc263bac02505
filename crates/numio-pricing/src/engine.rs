// SPDX-FileCopyrightText: 2026 Numio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Quote orchestration: cache, upstream fetch, FX cap, calculation.
//!
//! Concurrent misses on the same key may each fetch upstream; the call is
//! idempotent and the cache write is last-writer-wins over identical
//! values, so no single-flight guard is needed.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use numio_cache::TtlStore;
use numio_config::model::PricingConfig;
use numio_core::{NumberKind, NumioError, OrderIntent};
use numio_pva::{Fetched, PvaClient};

use crate::calculator::{PricingRules, calculate_price};
use crate::fx::FxRateSource;
use crate::key::QuoteKey;

/// A priced quote a user can commit to.
///
/// The inputs the price was computed from ride along for the audit trail;
/// a cache hit reproduces them unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    /// Final price in whole NGN.
    pub price_ngn: i64,
    /// Key identifying the inputs this price was computed from.
    pub key: QuoteKey,
    /// How long the number stays active once provisioned.
    pub duration_minutes: u32,
    /// Upstream cost the price was computed from.
    pub cost_usd: f64,
    /// FX rate actually applied, after the cap.
    pub fx_rate: f64,
    /// Markup percentage applied.
    pub markup_pct: u32,
}

/// Outcome of a quote request.
///
/// `Unavailable` is the ordinary "this combination cannot be priced right
/// now" answer; it is not an error and produces no side effects.
#[derive(Debug, Clone, PartialEq)]
pub enum QuoteOutcome {
    Priced(Quote),
    Unavailable,
}

/// Cached form of a quote, stored as JSON under the quote key.
#[derive(Debug, Serialize, Deserialize)]
struct CachedQuote {
    price_ngn: i64,
    duration_minutes: u32,
    cost_usd: f64,
    fx_rate: f64,
    markup_pct: u32,
}

impl CachedQuote {
    fn into_quote(self, key: QuoteKey) -> Quote {
        Quote {
            price_ngn: self.price_ngn,
            key,
            duration_minutes: self.duration_minutes,
            cost_usd: self.cost_usd,
            fx_rate: self.fx_rate,
            markup_pct: self.markup_pct,
        }
    }
}

/// The pricing engine.
pub struct PricingEngine {
    cache: Arc<TtlStore>,
    provider: Arc<PvaClient>,
    fx: Arc<dyn FxRateSource>,
    config: PricingConfig,
}

impl PricingEngine {
    /// Creates an engine over the shared cache, provider client, and FX source.
    pub fn new(
        cache: Arc<TtlStore>,
        provider: Arc<PvaClient>,
        fx: Arc<dyn FxRateSource>,
        config: PricingConfig,
    ) -> Self {
        Self {
            cache,
            provider,
            fx,
            config,
        }
    }

    fn rules(&self) -> PricingRules {
        PricingRules {
            markup_pct: self.config.markup_pct,
            increment: self.config.rounding_increment,
        }
    }

    /// Quotes a purchase order.
    ///
    /// Cache hit returns the cached price under the same key with no
    /// upstream call. Cache miss fetches the USD cost, applies the capped
    /// FX rate and markup, stores the result for the quote TTL, and
    /// returns it.
    pub async fn quote(&self, intent: &OrderIntent) -> Result<QuoteOutcome, NumioError> {
        let key = QuoteKey::purchase(intent);
        let duration_minutes = match intent.kind {
            NumberKind::Temporary => self.config.temp_duration_minutes,
            NumberKind::Rental { days } => days * 1440,
        };

        if let Some(cached) = self.cached(&key) {
            return Ok(QuoteOutcome::Priced(cached.into_quote(key)));
        }

        let cost_usd = match intent.kind {
            NumberKind::Temporary => {
                match self
                    .provider
                    .get_price(&intent.service, &intent.country)
                    .await?
                {
                    Fetched::Available(price) => price.cost_usd,
                    Fetched::Unavailable => {
                        debug!(
                            country = intent.country.as_str(),
                            service = intent.service.as_str(),
                            "no upstream price for combination"
                        );
                        return Ok(QuoteOutcome::Unavailable);
                    }
                }
            }
            // The provider has no rental price endpoint; rentals are
            // priced from the configured daily rate.
            NumberKind::Rental { days } => self.config.rental_daily_rate_usd * f64::from(days),
        };

        self.price_and_cache(key, cost_usd, duration_minutes).await
    }

    /// Quotes a rental renewal of `days` for an existing number.
    pub async fn renewal_quote(
        &self,
        number_id: i64,
        days: u32,
    ) -> Result<QuoteOutcome, NumioError> {
        let key = QuoteKey::renewal(number_id, days);
        let duration_minutes = days * 1440;

        if let Some(cached) = self.cached(&key) {
            return Ok(QuoteOutcome::Priced(cached.into_quote(key)));
        }

        let cost_usd = self.config.rental_daily_rate_usd * f64::from(days);
        self.price_and_cache(key, cost_usd, duration_minutes).await
    }

    fn cached(&self, key: &QuoteKey) -> Option<CachedQuote> {
        let raw = self.cache.get(&key.storage_key())?;
        match serde_json::from_str::<CachedQuote>(&raw) {
            Ok(cached) => {
                info!(quote_key = %key, price_ngn = cached.price_ngn, "quote cache hit");
                Some(cached)
            }
            Err(e) => {
                warn!(quote_key = %key, error = %e, "discarding unreadable cached quote");
                self.cache.remove(&key.storage_key());
                None
            }
        }
    }

    async fn price_and_cache(
        &self,
        key: QuoteKey,
        cost_usd: f64,
        duration_minutes: u32,
    ) -> Result<QuoteOutcome, NumioError> {
        let live_rate = self.fx.usd_to_ngn().await?;
        let fx_rate = live_rate.min(self.config.fx_rate_cap);
        debug!(
            live_rate,
            fx_rate,
            cap = self.config.fx_rate_cap,
            "fx rate selected"
        );

        let price_ngn = match calculate_price(cost_usd, fx_rate, &self.rules()) {
            Ok(price) => price,
            Err(NumioError::InvalidCost { .. }) | Err(NumioError::NonPositivePrice { .. }) => {
                warn!(quote_key = %key, cost_usd, "unpriceable combination");
                return Ok(QuoteOutcome::Unavailable);
            }
            Err(e) => return Err(e),
        };

        let cached = CachedQuote {
            price_ngn,
            duration_minutes,
            cost_usd,
            fx_rate,
            markup_pct: self.config.markup_pct,
        };
        let raw = serde_json::to_string(&cached).map_err(|e| NumioError::Internal(format!(
            "failed to serialize quote for cache: {e}"
        )))?;
        self.cache.set(
            &key.storage_key(),
            raw,
            Some(Duration::from_secs(self.config.quote_ttl_secs)),
        );
        info!(quote_key = %key, price_ngn, duration_minutes, "quote computed and cached");

        Ok(QuoteOutcome::Priced(cached.into_quote(key)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fx::StaticFxRate;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn engine_with(server_uri: &str, fx_rate: f64) -> PricingEngine {
        let provider =
            Arc::new(PvaClient::new("test-key".into(), server_uri.to_string()).unwrap());
        PricingEngine::new(
            Arc::new(TtlStore::new()),
            provider,
            Arc::new(StaticFxRate::new(fx_rate)),
            PricingConfig::default(),
        )
    }

    fn temp_intent() -> OrderIntent {
        OrderIntent {
            country: "Nigeria".into(),
            service: "WhatsApp".into(),
            kind: NumberKind::Temporary,
        }
    }

    #[tokio::test]
    async fn quote_prices_observed_scenario() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/get_price.php"))
            .respond_with(ResponseTemplate::new(200).set_body_string("0.50"))
            .mount(&server)
            .await;

        // Live rate above the cap: the cap must win.
        let engine = engine_with(&server.uri(), 2000.0);
        let outcome = engine.quote(&temp_intent()).await.unwrap();
        match outcome {
            QuoteOutcome::Priced(quote) => {
                assert_eq!(quote.price_ngn, 1600);
                assert_eq!(quote.duration_minutes, 15);
                assert_eq!(quote.key.storage_key(), "quote:Nigeria:WhatsApp:temp");
                assert_eq!(quote.cost_usd, 0.50);
                assert_eq!(quote.fx_rate, 1600.0, "the cap must win over the live rate");
                assert_eq!(quote.markup_pct, 100);
            }
            QuoteOutcome::Unavailable => panic!("expected a price"),
        }
    }

    #[tokio::test]
    async fn second_quote_within_ttl_skips_upstream() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/get_price.php"))
            .respond_with(ResponseTemplate::new(200).set_body_string("0.50"))
            .expect(1)
            .mount(&server)
            .await;

        let engine = engine_with(&server.uri(), 1550.75);
        let first = engine.quote(&temp_intent()).await.unwrap();
        let second = engine.quote(&temp_intent()).await.unwrap();
        assert_eq!(first, second, "cached quote must be identical, key included");
        // wiremock's expect(1) verifies the single upstream call on drop.
    }

    #[tokio::test]
    async fn unavailable_combination_is_not_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/get_price.php"))
            .respond_with(ResponseTemplate::new(200).set_body_string("Service not found"))
            .mount(&server)
            .await;

        let engine = engine_with(&server.uri(), 1550.75);
        let outcome = engine.quote(&temp_intent()).await.unwrap();
        assert_eq!(outcome, QuoteOutcome::Unavailable);
    }

    #[tokio::test]
    async fn rental_quote_uses_daily_rate_without_upstream() {
        let server = MockServer::start().await;
        // No mock mounted: an upstream call would 404 into a provider error.
        let engine = engine_with(&server.uri(), 1600.0);

        let intent = OrderIntent {
            country: "Malaysia".into(),
            service: "Telegram".into(),
            kind: NumberKind::Rental { days: 7 },
        };
        let outcome = engine.quote(&intent).await.unwrap();
        match outcome {
            QuoteOutcome::Priced(quote) => {
                // 0.50/day * 7 * 2 * 1600 = 11200.
                assert_eq!(quote.price_ngn, 11_200);
                assert_eq!(quote.duration_minutes, 7 * 1440);
            }
            QuoteOutcome::Unavailable => panic!("expected a rental price"),
        }
    }

    #[tokio::test]
    async fn renewal_quote_keys_on_the_number() {
        let server = MockServer::start().await;
        let engine = engine_with(&server.uri(), 1600.0);

        let outcome = engine.renewal_quote(42, 30).await.unwrap();
        match outcome {
            QuoteOutcome::Priced(quote) => {
                // 0.50/day * 30 * 2 * 1600 = 48000.
                assert_eq!(quote.price_ngn, 48_000);
                assert_eq!(quote.key.storage_key(), "quote:renew:42:30");
            }
            QuoteOutcome::Unavailable => panic!("expected a renewal price"),
        }
    }

    #[tokio::test]
    async fn live_rate_below_cap_is_used_directly() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/get_price.php"))
            .and(query_param("app", "Google"))
            .respond_with(ResponseTemplate::new(200).set_body_string("1.00"))
            .mount(&server)
            .await;

        let engine = engine_with(&server.uri(), 1000.0);
        let intent = OrderIntent {
            country: "USA".into(),
            service: "Google".into(),
            kind: NumberKind::Temporary,
        };
        let outcome = engine.quote(&intent).await.unwrap();
        match outcome {
            QuoteOutcome::Priced(quote) => assert_eq!(quote.price_ngn, 2000),
            QuoteOutcome::Unavailable => panic!("expected a price"),
        }
    }
}
