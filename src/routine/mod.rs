pub mod result;
pub mod status;

use serde_derive::{Deserialize, Serialize};
use std::fmt;

pub use self::result::{
    normalize_result, PowerRoutineResult, RoutineResult, RoutineResultInfo, RoutineResultRecord,
    StandardRoutineResult,
};
pub use self::status::{ExecutionProgress, ResultStatusItem, RoutineProperties};

/// Diagnostic routines known to the routine controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutineType {
    BatteryCapacity,
    BatteryHealth,
    BatteryCharge,
    BatteryDischarge,
    CpuStress,
    CpuCache,
    CpuFloatingPoint,
    CpuPrime,
    Memory,
    LanConnectivity,
    SignalStrength,
    GatewayCanBePinged,
    HasSecureWifiConnection,
    DnsResolverPresent,
    DnsLatency,
    DnsResolution,
    CaptivePortal,
    HttpFirewall,
    HttpsFirewall,
    HttpsLatency,
    ArcHttp,
    ArcPing,
    ArcDnsResolution,
}

impl RoutineType {
    pub fn name(&self) -> &'static str {
        match self {
            RoutineType::BatteryCapacity => "Battery capacity",
            RoutineType::BatteryHealth => "Battery health",
            RoutineType::BatteryCharge => "Battery charge",
            RoutineType::BatteryDischarge => "Battery discharge",
            RoutineType::CpuStress => "CPU stress",
            RoutineType::CpuCache => "CPU cache",
            RoutineType::CpuFloatingPoint => "CPU floating point accuracy",
            RoutineType::CpuPrime => "CPU prime search",
            RoutineType::Memory => "Memory",
            RoutineType::LanConnectivity => "LAN connectivity",
            RoutineType::SignalStrength => "Signal strength",
            RoutineType::GatewayCanBePinged => "Gateway can be pinged",
            RoutineType::HasSecureWifiConnection => "Secure Wi-Fi connection",
            RoutineType::DnsResolverPresent => "DNS resolver present",
            RoutineType::DnsLatency => "DNS latency",
            RoutineType::DnsResolution => "DNS resolution",
            RoutineType::CaptivePortal => "Captive portal",
            RoutineType::HttpFirewall => "HTTP firewall",
            RoutineType::HttpsFirewall => "HTTPS firewall",
            RoutineType::HttpsLatency => "HTTPS latency",
            RoutineType::ArcHttp => "ARC HTTP",
            RoutineType::ArcPing => "ARC ping",
            RoutineType::ArcDnsResolution => "ARC DNS resolution",
        }
    }
}

impl fmt::Display for RoutineType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
