//! Five-layer destination resolver
//!
//! Maps a natural-language destination phrase to a structured location with
//! a confidence score, using the cheapest available method first:
//!
//! 1. direct code match (0.95) - bare IATA airport/city codes
//! 2. fuzzy matching (0.80) - city names, aliases, airport names
//! 3. regional mapping (0.85) - multi-city regions like "French Riviera"
//! 4. geocoding (0.75) - external API, skipped without an API key
//! 5. LLM interpretation (0.70) - skipped without an LLM client
//!
//! Layers run in strict order and short-circuit as soon as one meets its
//! threshold. If none does, the single best candidate across all layers
//! wins (first seen on ties). Results are cached keyed by the raw input
//! text; fully-negative results get a short TTL so they are retried sooner.

pub mod data;
mod fuzzy;

use std::sync::Arc;
use std::time::Duration;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::LazyLock;
use tracing::{debug, warn};
use travelcache::{CacheCategory, CacheStore};

use crate::config::ResolverConfig;
use crate::geo::Geocoder;
use crate::llm::{CompletionRequest, LlmClient, extract_json};
use data::{AIRPORTS, CITY_CODES, REGIONS, airport_by_code, city_for_code, nearest_airport, primary_airport_for_city};

/// A resolution layer, in fallback order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layer {
    DirectMatch,
    FuzzyMatch,
    RegionalMapping,
    Geocoding,
    LlmInterpretation,
}

impl Layer {
    /// Confidence a layer's best candidate must meet to short-circuit
    pub fn threshold(&self) -> f64 {
        match self {
            Layer::DirectMatch => 0.95,
            Layer::FuzzyMatch => 0.80,
            Layer::RegionalMapping => 0.85,
            Layer::Geocoding => 0.75,
            Layer::LlmInterpretation => 0.70,
        }
    }
}

const LAYER_ORDER: &[Layer] = &[
    Layer::DirectMatch,
    Layer::FuzzyMatch,
    Layer::RegionalMapping,
    Layer::Geocoding,
    Layer::LlmInterpretation,
];

/// What kind of place a candidate denotes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaceKind {
    Airport,
    City,
    RegionCity,
    LlmSuggestion,
}

/// One scored location candidate, also the alternatives entry shape
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedPlace {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub airport_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city_code: Option<String>,
    pub city_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    pub confidence: f64,
    pub layer: Layer,
    #[serde(rename = "type")]
    pub kind: PlaceKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

/// Result of a destination resolution
///
/// Never an error: unresolvable input comes back as `resolved: false` with
/// an `error` message and the layers that were attempted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resolution {
    pub resolved: bool,
    pub original_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub airport_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution_layer: Option<Layer>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<PlaceKind>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alternatives: Vec<ResolvedPlace>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attempted_layers: Vec<Layer>,
}

impl Resolution {
    fn failure(text: &str, error: impl Into<String>, attempted_layers: Vec<Layer>) -> Self {
        Self {
            resolved: false,
            original_text: text.to_string(),
            airport_code: None,
            city_code: None,
            city_name: None,
            country: None,
            confidence: 0.0,
            resolution_layer: None,
            kind: None,
            alternatives: Vec::new(),
            metadata: None,
            error: Some(error.into()),
            attempted_layers,
        }
    }
}

/// An autocomplete suggestion
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    pub code: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
}

/// Context hints that bias resolution
#[derive(Debug, Clone, Default)]
pub struct ResolveContext {
    /// Country to bias geocoding toward (e.g. the departure country)
    pub departure_country: Option<String>,
}

static IATA_TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b([A-Z]{3})\b").expect("valid regex"));

/// Words stripped before matching ("the airport in Paris" -> "paris")
const FILLER_WORDS: &[&str] = &["airport", "international", "to", "from", "the", "a", "an"];

fn clean_text(text: &str) -> String {
    text.to_lowercase()
        .replace([',', '.', '!', '?'], " ")
        .split_whitespace()
        .filter(|w| !FILLER_WORDS.contains(w))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Per-metric fuzzy floors (percent)
const RATIO_FLOOR: u32 = 75;
const PARTIAL_FLOOR: u32 = 80;
const TOKEN_SORT_FLOOR: u32 = 75;

/// Minimum target length for the windowed partial metric
///
/// Short aliases like "la" or "sf" occur as bigrams inside unrelated
/// words; they must match exactly (plain ratio) or not at all.
const MIN_PARTIAL_TARGET_CHARS: usize = 4;

/// Candidate identity for alternatives dedup
///
/// Distinct cities can share an airport (the French Riviera towns all
/// route through NCE), so the airport code alone is not an identity.
fn dedup_key(place: &ResolvedPlace) -> String {
    format!(
        "{}|{}",
        place.airport_code.as_deref().unwrap_or("-"),
        place.city_name.to_lowercase()
    )
}

/// Fuzzy confidence never outranks a direct code hit
const FUZZY_CONFIDENCE_CAP: f64 = 0.93;

/// Multi-layer destination resolver
///
/// Stateless between calls; owns only its collaborator handles. All
/// collaborators are optional - an absent one disables its layer, never
/// errors.
pub struct DestinationResolver {
    config: ResolverConfig,
    cache: Option<Arc<dyn CacheStore>>,
    geocoder: Option<Arc<dyn Geocoder>>,
    llm: Option<Arc<dyn LlmClient>>,
}

impl DestinationResolver {
    pub fn new(config: ResolverConfig) -> Self {
        Self {
            config,
            cache: None,
            geocoder: None,
            llm: None,
        }
    }

    pub fn with_cache(mut self, cache: Arc<dyn CacheStore>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_geocoder(mut self, geocoder: Arc<dyn Geocoder>) -> Self {
        self.geocoder = Some(geocoder);
        self
    }

    pub fn with_llm(mut self, llm: Arc<dyn LlmClient>) -> Self {
        self.llm = Some(llm);
        self
    }

    /// Resolve free-text destination mention to a structured location
    ///
    /// `prefer_airports` biases tie-breaks toward candidates that carry an
    /// airport code. Never fails: check `resolved` on the result.
    pub async fn resolve_destination(
        &self,
        text: &str,
        prefer_airports: bool,
        context: Option<&ResolveContext>,
    ) -> Resolution {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            debug!("resolve_destination: empty input");
            return Resolution::failure(text, "Empty destination text", Vec::new());
        }

        // Cache hit returns the stored structure unchanged
        if let Some(cache) = &self.cache
            && let Some(hit) = cache.get(text, CacheCategory::DestinationResolution).await
        {
            match serde_json::from_value::<Resolution>(hit) {
                Ok(resolution) => {
                    debug!(text, "resolve_destination: cache hit");
                    return resolution;
                }
                Err(e) => warn!(text, error = %e, "resolve_destination: unreadable cache entry, re-resolving"),
            }
        }

        let cleaned = clean_text(trimmed);
        debug!(text, cleaned, "resolve_destination: resolving");

        let mut pool: Vec<ResolvedPlace> = Vec::new();
        let mut attempted: Vec<Layer> = Vec::new();
        let mut winner: Option<usize> = None;

        for &layer in LAYER_ORDER {
            let candidates = match layer {
                Layer::DirectMatch => self.direct_candidates(trimmed, &cleaned, prefer_airports),
                Layer::FuzzyMatch => self.fuzzy_candidates(&cleaned),
                Layer::RegionalMapping => self.regional_candidates(&cleaned),
                Layer::Geocoding => match &self.geocoder {
                    Some(geocoder) => self.geocode_candidates(geocoder.as_ref(), &cleaned, context).await,
                    None => continue,
                },
                Layer::LlmInterpretation => match &self.llm {
                    Some(llm) => self.llm_candidates(llm.as_ref(), trimmed, &cleaned, &pool).await,
                    None => continue,
                },
            };
            attempted.push(layer);

            let base = pool.len();
            // First-seen wins on ties within a layer
            let mut best_in_layer: Option<(usize, f64)> = None;
            for (i, candidate) in candidates.iter().enumerate() {
                if best_in_layer.is_none_or(|(_, best)| candidate.confidence > best) {
                    best_in_layer = Some((base + i, candidate.confidence));
                }
            }
            pool.extend(candidates);

            if let Some((idx, confidence)) = best_in_layer
                && confidence >= layer.threshold()
            {
                debug!(?layer, confidence, "resolve_destination: layer met threshold");
                winner = Some(idx);
                break;
            }
        }

        // No layer met its threshold; best candidate overall wins,
        // first-seen on ties (with an airport bias when requested)
        if winner.is_none() {
            let mut best: Option<usize> = None;
            for (i, candidate) in pool.iter().enumerate() {
                match best {
                    None => best = Some(i),
                    Some(b) => {
                        let current = &pool[b];
                        if candidate.confidence > current.confidence
                            || (prefer_airports
                                && candidate.confidence == current.confidence
                                && current.airport_code.is_none()
                                && candidate.airport_code.is_some())
                        {
                            best = Some(i);
                        }
                    }
                }
            }
            winner = best;
        }

        let resolution = match winner {
            Some(idx) => {
                let place = pool[idx].clone();
                let alternatives = self.collect_alternatives(&pool, idx, &place);
                Resolution {
                    resolved: true,
                    original_text: text.to_string(),
                    airport_code: place.airport_code,
                    city_code: place.city_code,
                    city_name: Some(place.city_name),
                    country: place.country,
                    confidence: place.confidence,
                    resolution_layer: Some(place.layer),
                    kind: Some(place.kind),
                    alternatives,
                    metadata: place.metadata,
                    error: None,
                    attempted_layers: Vec::new(),
                }
            }
            None => Resolution::failure(text, "Could not resolve destination through any layer", attempted),
        };

        self.cache_resolution(text, &resolution).await;
        resolution
    }

    /// Alternatives: lower-ranked candidates, deduplicated, highest first
    fn collect_alternatives(&self, pool: &[ResolvedPlace], winner: usize, winning: &ResolvedPlace) -> Vec<ResolvedPlace> {
        let mut ranked: Vec<&ResolvedPlace> = pool
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != winner)
            .map(|(_, c)| c)
            .collect();
        ranked.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

        let mut seen: Vec<String> = vec![dedup_key(winning)];
        let mut alternatives = Vec::new();
        for candidate in ranked {
            let key = dedup_key(candidate);
            if seen.contains(&key) {
                continue;
            }
            seen.push(key);
            alternatives.push(candidate.clone());
            if alternatives.len() >= self.config.max_alternatives {
                break;
            }
        }
        alternatives
    }

    async fn cache_resolution(&self, key: &str, resolution: &Resolution) {
        let Some(cache) = &self.cache else { return };
        let Ok(value) = serde_json::to_value(resolution) else { return };

        // Negative results retry sooner than the default resolution TTL
        let ttl = if resolution.resolved {
            None
        } else {
            Some(Duration::from_secs(self.config.negative_ttl_secs))
        };
        cache.set(key, value, ttl, CacheCategory::DestinationResolution).await;
    }

    // Layer 1: bare 3-letter codes against the airport and city tables
    fn direct_candidates(&self, original: &str, cleaned: &str, prefer_airports: bool) -> Vec<ResolvedPlace> {
        let mut tokens: Vec<String> = IATA_TOKEN
            .captures_iter(original)
            .map(|c| c[1].to_string())
            .collect();
        // A cleaned three-letter input counts even when lowercased
        if tokens.is_empty() && cleaned.len() == 3 && cleaned.chars().all(|c| c.is_ascii_alphabetic()) {
            tokens.push(cleaned.to_uppercase());
        }

        let mut candidates = Vec::new();
        for token in tokens {
            let airport_hit = airport_by_code(&token).map(|airport| ResolvedPlace {
                airport_code: Some(airport.code.to_string()),
                city_code: Some(airport.city_code.to_string()),
                city_name: airport.city.to_string(),
                country: Some(airport.country.to_string()),
                confidence: 0.95,
                layer: Layer::DirectMatch,
                kind: PlaceKind::Airport,
                metadata: None,
            });
            let city_hit = city_for_code(&token).map(|city| ResolvedPlace {
                airport_code: primary_airport_for_city(city).map(|a| a.code.to_string()),
                city_code: Some(token.clone()),
                city_name: city.to_string(),
                country: primary_airport_for_city(city).map(|a| a.country.to_string()),
                confidence: 0.95,
                layer: Layer::DirectMatch,
                kind: PlaceKind::City,
                metadata: None,
            });

            // Codes like NCE are both airport and metro code; order by preference
            let (first, second) = if prefer_airports { (airport_hit, city_hit) } else { (city_hit, airport_hit) };
            candidates.extend(first);
            candidates.extend(second);
        }
        candidates
    }

    // Layer 2: fuzzy comparison against city names, aliases, airport names
    fn fuzzy_candidates(&self, cleaned: &str) -> Vec<ResolvedPlace> {
        if cleaned.is_empty() {
            return Vec::new();
        }

        let mut candidates: Vec<ResolvedPlace> = Vec::new();
        for airport in AIRPORTS {
            // One candidate per city; table order keeps the primary airport
            if candidates.iter().any(|c| c.city_name == airport.city) {
                continue;
            }

            let mut targets: Vec<&str> = vec![airport.city, airport.name];
            targets.extend(airport.aliases);

            let mut best: u32 = 0;
            for target in targets {
                let r = fuzzy::ratio(cleaned, target);
                let p = if target.chars().count() >= MIN_PARTIAL_TARGET_CHARS {
                    fuzzy::partial_ratio(cleaned, target)
                } else {
                    0
                };
                let t = fuzzy::token_sort_ratio(cleaned, target);

                for score in [
                    (r >= RATIO_FLOOR).then_some(r),
                    (p >= PARTIAL_FLOOR).then_some(p),
                    (t >= TOKEN_SORT_FLOOR).then_some(t),
                ]
                .into_iter()
                .flatten()
                {
                    best = best.max(score);
                }
            }

            if best > 0 {
                candidates.push(ResolvedPlace {
                    airport_code: Some(airport.code.to_string()),
                    city_code: Some(airport.city_code.to_string()),
                    city_name: airport.city.to_string(),
                    country: Some(airport.country.to_string()),
                    confidence: (best as f64 / 100.0).min(FUZZY_CONFIDENCE_CAP),
                    layer: Layer::FuzzyMatch,
                    kind: PlaceKind::City,
                    metadata: None,
                });
            }
        }

        candidates.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        candidates.truncate(5);
        candidates
    }

    // Layer 3: known multi-city regions at fixed confidence
    fn regional_candidates(&self, cleaned: &str) -> Vec<ResolvedPlace> {
        let mut candidates = Vec::new();
        for region in REGIONS {
            let matched = region.aliases.iter().any(|alias| cleaned == *alias || cleaned.contains(alias));
            if !matched {
                continue;
            }
            debug!(region = region.name, "regional_candidates: matched region");
            for city in region.cities {
                candidates.push(ResolvedPlace {
                    airport_code: Some(city.airport.to_string()),
                    city_code: airport_by_code(city.airport).map(|a| a.city_code.to_string()),
                    city_name: city.name.to_string(),
                    country: Some(city.country.to_string()),
                    confidence: 0.85,
                    layer: Layer::RegionalMapping,
                    kind: PlaceKind::RegionCity,
                    metadata: Some(json!({ "region": region.name })),
                });
            }
        }
        candidates
    }

    // Layer 4: external geocoding, then nearest known airport
    async fn geocode_candidates(
        &self,
        geocoder: &dyn Geocoder,
        cleaned: &str,
        context: Option<&ResolveContext>,
    ) -> Vec<ResolvedPlace> {
        let bias = context.and_then(|c| c.departure_country.as_deref());
        let place = match geocoder.geocode(cleaned, bias).await {
            Ok(Some(place)) => place,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!(cleaned, error = %e, "geocode_candidates: geocoding failed, skipping layer");
                return Vec::new();
            }
        };

        let airport = place
            .city
            .as_deref()
            .and_then(primary_airport_for_city)
            .or_else(|| nearest_airport(place.lat, place.lng));

        let city_name = place.city.clone().unwrap_or_else(|| place.formatted_address.clone());
        vec![ResolvedPlace {
            airport_code: airport.map(|a| a.code.to_string()),
            city_code: airport.map(|a| a.city_code.to_string()),
            city_name,
            country: place.country.clone(),
            confidence: 0.75,
            layer: Layer::Geocoding,
            kind: PlaceKind::City,
            metadata: Some(json!({
                "lat": place.lat,
                "lng": place.lng,
                "formatted_address": place.formatted_address,
            })),
        }]
    }

    // Layer 5: last-resort LLM interpretation
    //
    // Interpretation replies are cached under their own category keyed by
    // the cleaned text, so punctuation variants of one phrase share a call.
    async fn llm_candidates(
        &self,
        llm: &dyn LlmClient,
        original: &str,
        cleaned: &str,
        prior: &[ResolvedPlace],
    ) -> Vec<ResolvedPlace> {
        if let Some(cache) = &self.cache
            && let Some(hit) = cache.get(cleaned, CacheCategory::LlmResponse).await
        {
            debug!(cleaned, "llm_candidates: interpretation cache hit");
            return self.interpretation_candidates(hit);
        }

        let mut context_lines = String::new();
        for candidate in prior.iter().take(3) {
            context_lines.push_str(&format!(
                "- {} ({}, confidence {:.2})\n",
                candidate.city_name,
                candidate.airport_code.as_deref().unwrap_or("no airport"),
                candidate.confidence
            ));
        }

        let system = "You interpret ambiguous travel destination text. \
                      Reply with ONLY a JSON object: \
                      {\"city_name\": string, \"country\": string, \"airport_code\": string or null, \
                      \"explanation\": string}. Use null for unknown fields.";
        let user = if context_lines.is_empty() {
            format!("Destination text: {:?}", original)
        } else {
            format!("Destination text: {:?}\nWeaker candidates so far:\n{}", original, context_lines)
        };

        let reply = match llm.generate(CompletionRequest::structured(system, user, 256)).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(original, error = %e, "llm_candidates: LLM call failed, skipping layer");
                return Vec::new();
            }
        };

        let Some(parsed) = extract_json(&reply) else {
            warn!(original, "llm_candidates: unparseable LLM reply, skipping layer");
            return Vec::new();
        };

        if let Some(cache) = &self.cache {
            cache.set(cleaned, parsed.clone(), None, CacheCategory::LlmResponse).await;
        }

        self.interpretation_candidates(parsed)
    }

    fn interpretation_candidates(&self, parsed: Value) -> Vec<ResolvedPlace> {
        let city_name = parsed["city_name"].as_str().map(str::to_string);
        let country = parsed["country"].as_str().map(str::to_string);
        let explanation = parsed["explanation"].as_str().map(str::to_string);

        // Reconcile against the airport table when possible
        if let Some(airport) = parsed["airport_code"].as_str().and_then(airport_by_code) {
            return vec![ResolvedPlace {
                airport_code: Some(airport.code.to_string()),
                city_code: Some(airport.city_code.to_string()),
                city_name: airport.city.to_string(),
                country: Some(airport.country.to_string()),
                confidence: 0.70,
                layer: Layer::LlmInterpretation,
                kind: PlaceKind::Airport,
                metadata: explanation.map(|e| json!({ "explanation": e })),
            }];
        }

        if let Some(city) = &city_name
            && let Some(airport) = primary_airport_for_city(city)
        {
            return vec![ResolvedPlace {
                airport_code: Some(airport.code.to_string()),
                city_code: Some(airport.city_code.to_string()),
                city_name: airport.city.to_string(),
                country: Some(airport.country.to_string()),
                confidence: 0.70,
                layer: Layer::LlmInterpretation,
                kind: PlaceKind::City,
                metadata: explanation.map(|e| json!({ "explanation": e })),
            }];
        }

        match city_name {
            Some(city_name) => vec![ResolvedPlace {
                airport_code: None,
                city_code: None,
                city_name,
                country,
                confidence: 0.65,
                layer: Layer::LlmInterpretation,
                kind: PlaceKind::LlmSuggestion,
                metadata: explanation.map(|e| json!({ "explanation": e })),
            }],
            None => Vec::new(),
        }
    }

    /// Autocomplete: substring match over known cities and airports
    ///
    /// No confidence thresholding; deduplicated by (code, type).
    pub fn get_suggestions(&self, partial: &str, limit: usize) -> Vec<Suggestion> {
        let needle = partial.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }

        let mut suggestions: Vec<Suggestion> = Vec::new();
        let push = |code: String, name: String, kind: &'static str, out: &mut Vec<Suggestion>| {
            if !out.iter().any(|s| s.code == code && s.kind == kind) {
                out.push(Suggestion { code, name, kind });
            }
        };

        for (code, city) in CITY_CODES {
            if city.to_lowercase().contains(&needle) || code.to_lowercase() == needle {
                push(code.to_string(), city.to_string(), "city", &mut suggestions);
            }
        }
        for airport in AIRPORTS {
            let matched = airport.city.to_lowercase().contains(&needle)
                || airport.name.to_lowercase().contains(&needle)
                || airport.code.to_lowercase() == needle
                || airport.aliases.iter().any(|a| a.contains(&needle));
            if matched {
                push(
                    airport.code.to_string(),
                    format!("{} ({})", airport.name, airport.city),
                    "airport",
                    &mut suggestions,
                );
            }
        }

        suggestions.truncate(limit);
        suggestions
    }
}
