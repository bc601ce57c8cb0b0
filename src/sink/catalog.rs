//! Exported metric families.
//!
//! Names and label keys are part of the scrape contract; dashboards depend
//! on them verbatim.

pub const WIFI_DEVICE_INFO: &str = "wifi_device_info";
pub const WIFI_PING_DROP_RATE: &str = "wifi_ping_drop_rate";
pub const WIFI_PING_LATENCY_MS: &str = "wifi_ping_latency_ms";
pub const WIFI_PING_REPORT_DROP_RATE: &str = "wifi_ping_report_drop_rate";
pub const WIFI_PING_REPORT_LATENCY_MS: &str = "wifi_ping_report_latency_ms";

pub const DISH_DEVICE_INFO: &str = "dish_device_info";
pub const DISH_POP_PING_DROP_RATE: &str = "dish_pop_ping_drop_rate";
pub const DISH_POP_PING_LATENCY_MS: &str = "dish_pop_ping_latency_ms";
pub const DISH_SNR: &str = "dish_snr";
pub const DISH_UPLINK_THROUGHPUT_BPS: &str = "dish_uplink_throughput_bps";
pub const DISH_DOWNLINK_THROUGHPUT_BPS: &str = "dish_downlink_throughput_bps";
pub const DISH_CURRENTLY_OBSTRUCTED: &str = "dish_currently_obstructed";
pub const DISH_FRACTION_OBSTRUCTED: &str = "dish_fraction_obstructed";
pub const DISH_LAST_24H_OBSTRUCTED_S: &str = "dish_last_24h_obstructed_s";
pub const DISH_VALID_S: &str = "dish_valid_s";
pub const DISH_WEDGE_FRACTION_OBSTRUCTED: &str = "dish_wedge_fraction_obstructed";
pub const DISH_WEDGE_ABS_FRACTION_OBSTRUCTED: &str = "dish_wedge_abs_fraction_obstructed";

pub const COLLECTOR_UP: &str = "starlink_exporter_collector_up";

pub const DEVICE_INFO_LABELS: [&str; 4] =
    ["id", "hardware_version", "software_version", "country_code"];
pub const WIFI_INFO_LABELS: [&str; 5] = [
    "id",
    "hardware_version",
    "software_version",
    "country_code",
    "sku",
];
pub const PING_TARGET_LABELS: [&str; 3] = ["service", "location", "address"];
pub const WEDGE_LABELS: [&str; 1] = ["degrees"];
pub const COLLECTOR_LABELS: [&str; 1] = ["collector"];

/// Static description of one gauge family.
#[derive(Debug, Clone, Copy)]
pub struct Family {
    pub name: &'static str,
    pub help: &'static str,
    pub labels: &'static [&'static str],
}

impl Family {
    const fn new(name: &'static str, help: &'static str, labels: &'static [&'static str]) -> Self {
        Self { name, help, labels }
    }
}

/// Every family the exporter registers.
pub const FAMILIES: &[Family] = &[
    Family::new(WIFI_DEVICE_INFO, "Wifi router identity, always 1", &WIFI_INFO_LABELS),
    Family::new(WIFI_PING_DROP_RATE, "Wifi router ping drop rate", &[]),
    Family::new(WIFI_PING_LATENCY_MS, "Wifi router ping latency in milliseconds", &[]),
    Family::new(
        WIFI_PING_REPORT_DROP_RATE,
        "Ping drop rate per destination",
        &PING_TARGET_LABELS,
    ),
    Family::new(
        WIFI_PING_REPORT_LATENCY_MS,
        "Ping latency per destination in milliseconds",
        &PING_TARGET_LABELS,
    ),
    Family::new(DISH_DEVICE_INFO, "Dish identity, always 1", &DEVICE_INFO_LABELS),
    Family::new(DISH_POP_PING_DROP_RATE, "Dish PoP ping drop rate", &[]),
    Family::new(DISH_POP_PING_LATENCY_MS, "Dish PoP ping latency in milliseconds", &[]),
    Family::new(DISH_SNR, "Dish signal to noise ratio", &[]),
    Family::new(DISH_UPLINK_THROUGHPUT_BPS, "Dish uplink throughput in bits per second", &[]),
    Family::new(
        DISH_DOWNLINK_THROUGHPUT_BPS,
        "Dish downlink throughput in bits per second",
        &[],
    ),
    Family::new(DISH_CURRENTLY_OBSTRUCTED, "1 if the dish is obstructed right now", &[]),
    Family::new(DISH_FRACTION_OBSTRUCTED, "Fraction of time the dish was obstructed", &[]),
    Family::new(
        DISH_LAST_24H_OBSTRUCTED_S,
        "Seconds obstructed over the last 24 hours",
        &[],
    ),
    Family::new(DISH_VALID_S, "Seconds of valid obstruction data", &[]),
    Family::new(
        DISH_WEDGE_FRACTION_OBSTRUCTED,
        "Obstructed fraction per 30 degree wedge",
        &WEDGE_LABELS,
    ),
    Family::new(
        DISH_WEDGE_ABS_FRACTION_OBSTRUCTED,
        "Absolute obstructed fraction per 30 degree wedge",
        &WEDGE_LABELS,
    ),
    Family::new(
        COLLECTOR_UP,
        "1 if the collector's last cycle succeeded, 0 if it failed",
        &COLLECTOR_LABELS,
    ),
];

/// Width of one obstruction wedge.
pub const WEDGE_DEGREES: usize = 30;

/// `degrees` label value for wedge `index` (0, 30, ..., 330).
pub fn wedge_label(index: usize) -> String {
    (index * WEDGE_DEGREES).to_string()
}
