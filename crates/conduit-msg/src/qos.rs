//! ---
//! conduit_section: "02-messaging-ipc-data-model"
//! conduit_subsection: "module"
//! conduit_type: "source"
//! conduit_scope: "code"
//! conduit_description: "Envelope model, message bodies and subscription QoS."
//! conduit_version: "v0.0.0-prealpha"
//! conduit_owner: "tbd"
//! ---
//! Subscription QoS resolution.
//!
//! Raw timing input arrives as [`QosSettings`] (built in code or parsed from a
//! JSON object, legacy field names included). Each variant's constructor
//! resolves it once: bounded fields are clamped into their `[MIN, MAX]`
//! ranges, cross-field ordering is enforced, and input that no clamp can
//! repair is rejected with a [`QosError`]. The resulting values are immutable
//! apart from the `clear_expiry_date` and `clear_alert_after_interval`
//! mutators.

use conduit_common::time::{Clock, SystemClock};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

/// Lower bound for `publicationTtlMs`.
pub const MIN_PUBLICATION_TTL_MS: i64 = 100;
/// Upper bound for `publicationTtlMs` (30 days).
pub const MAX_PUBLICATION_TTL_MS: i64 = 2_592_000_000;
/// `publicationTtlMs` applied when none is supplied.
pub const DEFAULT_PUBLICATION_TTL_MS: i64 = 10_000;
/// Lower bound for `expiryDateMs`.
pub const MIN_EXPIRY_MS: i64 = 0;
/// Sentinel meaning the subscription never expires.
pub const NO_EXPIRY_DATE: i64 = 0;
/// Sentinel meaning no missed-publication alert is raised.
pub const NO_ALERT_AFTER_INTERVAL: i64 = 0;
/// `alertAfterIntervalMs` applied when none is supplied.
pub const DEFAULT_ALERT_AFTER_INTERVAL_MS: i64 = NO_ALERT_AFTER_INTERVAL;
/// Upper bound for `alertAfterIntervalMs` (30 days).
pub const MAX_ALERT_AFTER_INTERVAL_MS: i64 = 2_592_000_000;

/// Input that cannot be turned into a bounded QoS contract.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QosError {
    /// The settings document is not a JSON object.
    #[error("subscription qos settings must be an object, got {found}")]
    NotAnObject {
        /// JSON kind that was supplied instead.
        found: &'static str,
    },
    /// A field holds something other than an integer.
    #[error("subscription qos field `{field}` must be an integer, got {found}")]
    InvalidType {
        /// Offending field name, as supplied.
        field: &'static str,
        /// JSON kind that was supplied instead.
        found: &'static str,
    },
    /// The periodic publication interval lies outside its permitted range.
    #[error("periodMs {value} is outside [{min}, {max}]")]
    PeriodOutOfRange {
        /// Requested period.
        value: i64,
        /// Smallest permitted period.
        min: i64,
        /// Largest permitted period.
        max: i64,
    },
    /// A negative publication TTL has no valid clamp target.
    #[error("publicationTtlMs must not be negative, got {0}")]
    NegativePublicationTtl(i64),
    /// Both an absolute expiry date and a relative validity were supplied.
    #[error("expiryDateMs and validityMs are mutually exclusive")]
    ConflictingExpiry,
}

/// Field names accepted by [`QosSettings::from_json`]; the legacy spelling is
/// only consulted when the current one is absent.
const MIN_INTERVAL: (&str, &str) = ("minIntervalMs", "minInterval");
const MAX_INTERVAL: (&str, &str) = ("maxIntervalMs", "maxInterval");
const PERIOD: (&str, &str) = ("periodMs", "period");
const EXPIRY_DATE: (&str, &str) = ("expiryDateMs", "expiryDate");
const ALERT_AFTER_INTERVAL: (&str, &str) = ("alertAfterIntervalMs", "alertAfterInterval");
const PUBLICATION_TTL: (&str, &str) = ("publicationTtlMs", "publicationTtl");
const VALIDITY: &str = "validityMs";

/// Raw, unvalidated subscription timing input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QosSettings {
    /// Minimum interval between on-change publications.
    pub min_interval_ms: Option<i64>,
    /// Keep-alive interval of on-change-with-keep-alive subscriptions.
    pub max_interval_ms: Option<i64>,
    /// Publication period of periodic subscriptions.
    pub period_ms: Option<i64>,
    /// Absolute expiry, epoch milliseconds.
    pub expiry_date_ms: Option<i64>,
    /// Expiry relative to construction time; replaces `expiry_date_ms`.
    pub validity_ms: Option<i64>,
    /// Delay after which a missed publication raises an alert.
    pub alert_after_interval_ms: Option<i64>,
    /// Time-to-live of each publication.
    pub publication_ttl_ms: Option<i64>,
}

impl QosSettings {
    /// Empty settings; every field takes its variant default.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the minimum interval.
    pub fn min_interval_ms(mut self, value: i64) -> Self {
        self.min_interval_ms = Some(value);
        self
    }

    /// Set the keep-alive interval.
    pub fn max_interval_ms(mut self, value: i64) -> Self {
        self.max_interval_ms = Some(value);
        self
    }

    /// Set the publication period.
    pub fn period_ms(mut self, value: i64) -> Self {
        self.period_ms = Some(value);
        self
    }

    /// Set the absolute expiry date.
    pub fn expiry_date_ms(mut self, value: i64) -> Self {
        self.expiry_date_ms = Some(value);
        self
    }

    /// Set a validity relative to construction time.
    pub fn validity_ms(mut self, value: i64) -> Self {
        self.validity_ms = Some(value);
        self
    }

    /// Set the alert interval.
    pub fn alert_after_interval_ms(mut self, value: i64) -> Self {
        self.alert_after_interval_ms = Some(value);
        self
    }

    /// Set the publication time-to-live.
    pub fn publication_ttl_ms(mut self, value: i64) -> Self {
        self.publication_ttl_ms = Some(value);
        self
    }

    /// Parse settings from a JSON object, resolving legacy field names.
    ///
    /// `null` counts as absent. Unknown keys (including `_typeName`) are ignored.
    pub fn from_json(value: &Value) -> Result<Self, QosError> {
        let map = value.as_object().ok_or(QosError::NotAnObject {
            found: json_kind(value),
        })?;
        Ok(Self {
            min_interval_ms: read_aliased(map, MIN_INTERVAL)?,
            max_interval_ms: read_aliased(map, MAX_INTERVAL)?,
            period_ms: read_aliased(map, PERIOD)?,
            expiry_date_ms: read_aliased(map, EXPIRY_DATE)?,
            validity_ms: read_field(map, VALIDITY)?,
            alert_after_interval_ms: read_aliased(map, ALERT_AFTER_INTERVAL)?,
            publication_ttl_ms: read_aliased(map, PUBLICATION_TTL)?,
        })
    }
}

impl<'de> Deserialize<'de> for QosSettings {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        QosSettings::from_json(&value).map_err(D::Error::custom)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn read_aliased(
    map: &Map<String, Value>,
    (current, legacy): (&'static str, &'static str),
) -> Result<Option<i64>, QosError> {
    match read_field(map, current)? {
        Some(value) => Ok(Some(value)),
        None => read_field(map, legacy),
    }
}

fn read_field(map: &Map<String, Value>, field: &'static str) -> Result<Option<i64>, QosError> {
    match map.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value
            .as_i64()
            .or_else(|| {
                value
                    .as_f64()
                    .filter(|float| float.fract() == 0.0)
                    .map(|float| float as i64)
            })
            .map(Some)
            .ok_or(QosError::InvalidType {
                field,
                found: json_kind(value),
            }),
    }
}

fn clamp_field(field: &'static str, value: i64, min: i64, max: i64) -> i64 {
    if value < min {
        warn!(field, value, min, "subscription qos value below minimum; raising");
        min
    } else if value > max {
        warn!(field, value, max, "subscription qos value above maximum; lowering");
        max
    } else {
        value
    }
}

/// Fields shared by every variant, resolved against `now_ms`.
struct CommonQos {
    expiry_date_ms: i64,
    publication_ttl_ms: i64,
}

fn resolve_common(settings: &QosSettings, now_ms: i64) -> Result<CommonQos, QosError> {
    let expiry_date_ms = match (settings.expiry_date_ms, settings.validity_ms) {
        (Some(_), Some(_)) => return Err(QosError::ConflictingExpiry),
        (None, Some(validity)) => now_ms.saturating_add(validity),
        (Some(expiry), None) => expiry,
        (None, None) => NO_EXPIRY_DATE,
    };
    let expiry_date_ms = if expiry_date_ms < MIN_EXPIRY_MS {
        warn!(
            expiry_date_ms,
            min = MIN_EXPIRY_MS,
            "subscription expiry date before epoch; raising"
        );
        MIN_EXPIRY_MS
    } else {
        expiry_date_ms
    };

    let publication_ttl_ms = settings
        .publication_ttl_ms
        .unwrap_or(DEFAULT_PUBLICATION_TTL_MS);
    if publication_ttl_ms < 0 {
        return Err(QosError::NegativePublicationTtl(publication_ttl_ms));
    }
    let publication_ttl_ms = clamp_field(
        "publicationTtlMs",
        publication_ttl_ms,
        MIN_PUBLICATION_TTL_MS,
        MAX_PUBLICATION_TTL_MS,
    );

    Ok(CommonQos {
        expiry_date_ms,
        publication_ttl_ms,
    })
}

/// Alert interval after raising it to the effective publication interval.
fn resolve_alert(alert_after_interval_ms: i64, interval_ms: i64) -> i64 {
    if alert_after_interval_ms == NO_ALERT_AFTER_INTERVAL {
        return NO_ALERT_AFTER_INTERVAL;
    }
    let raised = if alert_after_interval_ms < interval_ms {
        warn!(
            alert_after_interval_ms,
            interval_ms, "alertAfterIntervalMs below publication interval; raising"
        );
        interval_ms
    } else {
        alert_after_interval_ms
    };
    clamp_field(
        "alertAfterIntervalMs",
        raised,
        NO_ALERT_AFTER_INTERVAL,
        MAX_ALERT_AFTER_INTERVAL_MS,
    )
}

fn resolve_min_interval(settings: &QosSettings) -> i64 {
    clamp_field(
        "minIntervalMs",
        settings
            .min_interval_ms
            .unwrap_or(OnChangeSubscriptionQos::DEFAULT_MIN_INTERVAL_MS),
        OnChangeSubscriptionQos::MIN_MIN_INTERVAL_MS,
        OnChangeSubscriptionQos::MAX_MIN_INTERVAL_MS,
    )
}

/// Publications are sent at a fixed period regardless of value changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "QosSettings")]
pub struct PeriodicSubscriptionQos {
    period_ms: i64,
    expiry_date_ms: i64,
    alert_after_interval_ms: i64,
    publication_ttl_ms: i64,
}

impl PeriodicSubscriptionQos {
    /// Smallest permitted period.
    pub const MIN_PERIOD_MS: i64 = 50;
    /// Largest permitted period (30 days).
    pub const MAX_PERIOD_MS: i64 = 2_592_000_000;
    /// Period applied when none is supplied.
    pub const DEFAULT_PERIOD_MS: i64 = 60_000;

    /// Resolve settings against the system clock.
    pub fn new(settings: QosSettings) -> Result<Self, QosError> {
        Self::resolve(settings, &SystemClock)
    }

    /// Resolve settings, computing `validityMs` relative to `clock`.
    pub fn resolve(settings: QosSettings, clock: &dyn Clock) -> Result<Self, QosError> {
        let common = resolve_common(&settings, clock.now_ms())?;
        let period_ms = settings.period_ms.unwrap_or(Self::DEFAULT_PERIOD_MS);
        if !(Self::MIN_PERIOD_MS..=Self::MAX_PERIOD_MS).contains(&period_ms) {
            return Err(QosError::PeriodOutOfRange {
                value: period_ms,
                min: Self::MIN_PERIOD_MS,
                max: Self::MAX_PERIOD_MS,
            });
        }
        let alert_after_interval_ms = resolve_alert(
            settings
                .alert_after_interval_ms
                .unwrap_or(DEFAULT_ALERT_AFTER_INTERVAL_MS),
            period_ms,
        );
        Ok(Self {
            period_ms,
            expiry_date_ms: common.expiry_date_ms,
            alert_after_interval_ms,
            publication_ttl_ms: common.publication_ttl_ms,
        })
    }

    /// Publication period.
    pub fn period_ms(&self) -> i64 {
        self.period_ms
    }

    /// Absolute expiry, or [`NO_EXPIRY_DATE`].
    pub fn expiry_date_ms(&self) -> i64 {
        self.expiry_date_ms
    }

    /// Alert delay, or [`NO_ALERT_AFTER_INTERVAL`].
    pub fn alert_after_interval_ms(&self) -> i64 {
        self.alert_after_interval_ms
    }

    /// Publication time-to-live.
    pub fn publication_ttl_ms(&self) -> i64 {
        self.publication_ttl_ms
    }

    /// Make the subscription open-ended.
    pub fn clear_expiry_date(&mut self) {
        self.expiry_date_ms = NO_EXPIRY_DATE;
    }

    /// Disable the missed-publication alert.
    pub fn clear_alert_after_interval(&mut self) {
        self.alert_after_interval_ms = NO_ALERT_AFTER_INTERVAL;
    }
}

impl Default for PeriodicSubscriptionQos {
    fn default() -> Self {
        Self {
            period_ms: Self::DEFAULT_PERIOD_MS,
            expiry_date_ms: NO_EXPIRY_DATE,
            alert_after_interval_ms: DEFAULT_ALERT_AFTER_INTERVAL_MS,
            publication_ttl_ms: DEFAULT_PUBLICATION_TTL_MS,
        }
    }
}

impl TryFrom<QosSettings> for PeriodicSubscriptionQos {
    type Error = QosError;

    fn try_from(settings: QosSettings) -> Result<Self, Self::Error> {
        Self::new(settings)
    }
}

/// Publications are sent when the value changes, at most once per `minIntervalMs`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "QosSettings")]
pub struct OnChangeSubscriptionQos {
    min_interval_ms: i64,
    expiry_date_ms: i64,
    publication_ttl_ms: i64,
}

impl OnChangeSubscriptionQos {
    /// Smallest permitted minimum interval.
    pub const MIN_MIN_INTERVAL_MS: i64 = 0;
    /// Largest permitted minimum interval (30 days).
    pub const MAX_MIN_INTERVAL_MS: i64 = 2_592_000_000;
    /// Minimum interval applied when none is supplied.
    pub const DEFAULT_MIN_INTERVAL_MS: i64 = 1_000;

    /// Resolve settings against the system clock.
    pub fn new(settings: QosSettings) -> Result<Self, QosError> {
        Self::resolve(settings, &SystemClock)
    }

    /// Resolve settings, computing `validityMs` relative to `clock`.
    pub fn resolve(settings: QosSettings, clock: &dyn Clock) -> Result<Self, QosError> {
        let common = resolve_common(&settings, clock.now_ms())?;
        Ok(Self {
            min_interval_ms: resolve_min_interval(&settings),
            expiry_date_ms: common.expiry_date_ms,
            publication_ttl_ms: common.publication_ttl_ms,
        })
    }

    /// Minimum interval between publications.
    pub fn min_interval_ms(&self) -> i64 {
        self.min_interval_ms
    }

    /// Absolute expiry, or [`NO_EXPIRY_DATE`].
    pub fn expiry_date_ms(&self) -> i64 {
        self.expiry_date_ms
    }

    /// Publication time-to-live.
    pub fn publication_ttl_ms(&self) -> i64 {
        self.publication_ttl_ms
    }

    /// Make the subscription open-ended.
    pub fn clear_expiry_date(&mut self) {
        self.expiry_date_ms = NO_EXPIRY_DATE;
    }
}

impl Default for OnChangeSubscriptionQos {
    fn default() -> Self {
        Self {
            min_interval_ms: Self::DEFAULT_MIN_INTERVAL_MS,
            expiry_date_ms: NO_EXPIRY_DATE,
            publication_ttl_ms: DEFAULT_PUBLICATION_TTL_MS,
        }
    }
}

impl TryFrom<QosSettings> for OnChangeSubscriptionQos {
    type Error = QosError;

    fn try_from(settings: QosSettings) -> Result<Self, Self::Error> {
        Self::new(settings)
    }
}

/// On-change publications plus a keep-alive publication every `maxIntervalMs`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "QosSettings")]
pub struct OnChangeWithKeepAliveSubscriptionQos {
    min_interval_ms: i64,
    max_interval_ms: i64,
    expiry_date_ms: i64,
    alert_after_interval_ms: i64,
    publication_ttl_ms: i64,
}

impl OnChangeWithKeepAliveSubscriptionQos {
    /// Smallest permitted keep-alive interval.
    pub const MIN_MAX_INTERVAL_MS: i64 = 50;
    /// Largest permitted keep-alive interval (30 days).
    pub const MAX_MAX_INTERVAL_MS: i64 = 2_592_000_000;
    /// Keep-alive interval applied when none is supplied.
    pub const DEFAULT_MAX_INTERVAL_MS: i64 = 60_000;

    /// Resolve settings against the system clock.
    pub fn new(settings: QosSettings) -> Result<Self, QosError> {
        Self::resolve(settings, &SystemClock)
    }

    /// Resolve settings, computing `validityMs` relative to `clock`.
    pub fn resolve(settings: QosSettings, clock: &dyn Clock) -> Result<Self, QosError> {
        let common = resolve_common(&settings, clock.now_ms())?;
        let min_interval_ms = resolve_min_interval(&settings);
        let max_interval_ms = clamp_field(
            "maxIntervalMs",
            settings
                .max_interval_ms
                .unwrap_or(Self::DEFAULT_MAX_INTERVAL_MS),
            Self::MIN_MAX_INTERVAL_MS,
            Self::MAX_MAX_INTERVAL_MS,
        );
        let max_interval_ms = if max_interval_ms < min_interval_ms {
            warn!(
                max_interval_ms,
                min_interval_ms, "maxIntervalMs below minIntervalMs; raising"
            );
            min_interval_ms
        } else {
            max_interval_ms
        };
        let alert_after_interval_ms = resolve_alert(
            settings
                .alert_after_interval_ms
                .unwrap_or(DEFAULT_ALERT_AFTER_INTERVAL_MS),
            max_interval_ms,
        );
        Ok(Self {
            min_interval_ms,
            max_interval_ms,
            expiry_date_ms: common.expiry_date_ms,
            alert_after_interval_ms,
            publication_ttl_ms: common.publication_ttl_ms,
        })
    }

    /// Minimum interval between publications.
    pub fn min_interval_ms(&self) -> i64 {
        self.min_interval_ms
    }

    /// Keep-alive interval.
    pub fn max_interval_ms(&self) -> i64 {
        self.max_interval_ms
    }

    /// Absolute expiry, or [`NO_EXPIRY_DATE`].
    pub fn expiry_date_ms(&self) -> i64 {
        self.expiry_date_ms
    }

    /// Alert delay, or [`NO_ALERT_AFTER_INTERVAL`].
    pub fn alert_after_interval_ms(&self) -> i64 {
        self.alert_after_interval_ms
    }

    /// Publication time-to-live.
    pub fn publication_ttl_ms(&self) -> i64 {
        self.publication_ttl_ms
    }

    /// Make the subscription open-ended.
    pub fn clear_expiry_date(&mut self) {
        self.expiry_date_ms = NO_EXPIRY_DATE;
    }

    /// Disable the missed-publication alert.
    pub fn clear_alert_after_interval(&mut self) {
        self.alert_after_interval_ms = NO_ALERT_AFTER_INTERVAL;
    }
}

impl Default for OnChangeWithKeepAliveSubscriptionQos {
    fn default() -> Self {
        Self {
            min_interval_ms: OnChangeSubscriptionQos::DEFAULT_MIN_INTERVAL_MS,
            max_interval_ms: Self::DEFAULT_MAX_INTERVAL_MS,
            expiry_date_ms: NO_EXPIRY_DATE,
            alert_after_interval_ms: DEFAULT_ALERT_AFTER_INTERVAL_MS,
            publication_ttl_ms: DEFAULT_PUBLICATION_TTL_MS,
        }
    }
}

impl TryFrom<QosSettings> for OnChangeWithKeepAliveSubscriptionQos {
    type Error = QosError;

    fn try_from(settings: QosSettings) -> Result<Self, Self::Error> {
        Self::new(settings)
    }
}

/// Timing contract of a subscription, tagged by `_typeName` on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "_typeName")]
pub enum SubscriptionQos {
    /// Fixed-period publications.
    #[serde(rename = "joynr.PeriodicSubscriptionQos")]
    Periodic(PeriodicSubscriptionQos),
    /// Publications on value change.
    #[serde(rename = "joynr.OnChangeSubscriptionQos")]
    OnChange(OnChangeSubscriptionQos),
    /// Publications on value change plus keep-alive.
    #[serde(rename = "joynr.OnChangeWithKeepAliveSubscriptionQos")]
    OnChangeWithKeepAlive(OnChangeWithKeepAliveSubscriptionQos),
}

impl SubscriptionQos {
    /// Absolute expiry, or [`NO_EXPIRY_DATE`].
    pub fn expiry_date_ms(&self) -> i64 {
        match self {
            SubscriptionQos::Periodic(qos) => qos.expiry_date_ms,
            SubscriptionQos::OnChange(qos) => qos.expiry_date_ms,
            SubscriptionQos::OnChangeWithKeepAlive(qos) => qos.expiry_date_ms,
        }
    }

    /// Publication time-to-live.
    pub fn publication_ttl_ms(&self) -> i64 {
        match self {
            SubscriptionQos::Periodic(qos) => qos.publication_ttl_ms,
            SubscriptionQos::OnChange(qos) => qos.publication_ttl_ms,
            SubscriptionQos::OnChangeWithKeepAlive(qos) => qos.publication_ttl_ms,
        }
    }

    /// Alert delay; plain on-change subscriptions never alert.
    pub fn alert_after_interval_ms(&self) -> i64 {
        match self {
            SubscriptionQos::Periodic(qos) => qos.alert_after_interval_ms,
            SubscriptionQos::OnChange(_) => NO_ALERT_AFTER_INTERVAL,
            SubscriptionQos::OnChangeWithKeepAlive(qos) => qos.alert_after_interval_ms,
        }
    }

    /// Make the subscription open-ended.
    pub fn clear_expiry_date(&mut self) {
        match self {
            SubscriptionQos::Periodic(qos) => qos.clear_expiry_date(),
            SubscriptionQos::OnChange(qos) => qos.clear_expiry_date(),
            SubscriptionQos::OnChangeWithKeepAlive(qos) => qos.clear_expiry_date(),
        }
    }

    /// Disable the missed-publication alert where the variant has one.
    pub fn clear_alert_after_interval(&mut self) {
        match self {
            SubscriptionQos::Periodic(qos) => qos.clear_alert_after_interval(),
            SubscriptionQos::OnChange(_) => {}
            SubscriptionQos::OnChangeWithKeepAlive(qos) => qos.clear_alert_after_interval(),
        }
    }
}

impl Default for SubscriptionQos {
    fn default() -> Self {
        SubscriptionQos::Periodic(PeriodicSubscriptionQos::default())
    }
}

impl From<PeriodicSubscriptionQos> for SubscriptionQos {
    fn from(qos: PeriodicSubscriptionQos) -> Self {
        SubscriptionQos::Periodic(qos)
    }
}

impl From<OnChangeSubscriptionQos> for SubscriptionQos {
    fn from(qos: OnChangeSubscriptionQos) -> Self {
        SubscriptionQos::OnChange(qos)
    }
}

impl From<OnChangeWithKeepAliveSubscriptionQos> for SubscriptionQos {
    fn from(qos: OnChangeWithKeepAliveSubscriptionQos) -> Self {
        SubscriptionQos::OnChangeWithKeepAlive(qos)
    }
}
