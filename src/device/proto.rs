//! Device RPC messages (`SpaceX.API.Device`).
//!
//! Only the fields the exporter consumes are declared; prost skips unknown
//! fields on decode, so the full device schema stays wire compatible.

/// Fully qualified gRPC service name.
pub const SERVICE: &str = "SpaceX.API.Device.Device";

/// Path of the single unary method every request goes through.
pub const HANDLE_PATH: &str = "/SpaceX.API.Device.Device/Handle";

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Request {
    #[prost(uint64, tag = "1")]
    pub id: u64,
    #[prost(oneof = "request::Request", tags = "1004, 1007, 1009")]
    pub request: ::core::option::Option<request::Request>,
}

pub mod request {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Request {
        #[prost(message, tag = "1004")]
        GetStatus(super::GetStatusRequest),
        #[prost(message, tag = "1007")]
        GetHistory(super::GetHistoryRequest),
        #[prost(message, tag = "1009")]
        GetPing(super::GetPingRequest),
    }
}

impl Request {
    pub fn get_status() -> Self {
        Self {
            id: 0,
            request: Some(request::Request::GetStatus(GetStatusRequest {})),
        }
    }

    pub fn get_history() -> Self {
        Self {
            id: 0,
            request: Some(request::Request::GetHistory(GetHistoryRequest {})),
        }
    }

    pub fn get_ping() -> Self {
        Self {
            id: 0,
            request: Some(request::Request::GetPing(GetPingRequest {})),
        }
    }

    /// Method name used in logs and errors.
    pub fn method(&self) -> &'static str {
        match self.request {
            Some(request::Request::GetStatus(_)) => "GetStatus",
            Some(request::Request::GetHistory(_)) => "GetHistory",
            Some(request::Request::GetPing(_)) => "GetPing",
            None => "Handle",
        }
    }
}

#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct GetStatusRequest {}

#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct GetHistoryRequest {}

#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct GetPingRequest {}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Response {
    #[prost(uint64, tag = "1")]
    pub id: u64,
    #[prost(oneof = "response::Response", tags = "1009, 2004, 2006, 3004")]
    pub response: ::core::option::Option<response::Response>,
}

pub mod response {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Response {
        #[prost(message, tag = "1009")]
        GetPing(super::GetPingResponse),
        #[prost(message, tag = "2004")]
        DishGetStatus(super::DishGetStatusResponse),
        #[prost(message, tag = "2006")]
        DishGetHistory(super::DishGetHistoryResponse),
        #[prost(message, tag = "3004")]
        WifiGetStatus(super::WifiGetStatusResponse),
    }
}

impl Response {
    pub fn dish_get_status(status: DishGetStatusResponse) -> Self {
        Self {
            id: 0,
            response: Some(response::Response::DishGetStatus(status)),
        }
    }

    pub fn dish_get_history(history: DishGetHistoryResponse) -> Self {
        Self {
            id: 0,
            response: Some(response::Response::DishGetHistory(history)),
        }
    }

    pub fn wifi_get_status(status: WifiGetStatusResponse) -> Self {
        Self {
            id: 0,
            response: Some(response::Response::WifiGetStatus(status)),
        }
    }

    pub fn get_ping(ping: GetPingResponse) -> Self {
        Self {
            id: 0,
            response: Some(response::Response::GetPing(ping)),
        }
    }

    pub fn into_dish_get_status(self) -> Option<DishGetStatusResponse> {
        match self.response {
            Some(response::Response::DishGetStatus(status)) => Some(status),
            _ => None,
        }
    }

    pub fn into_dish_get_history(self) -> Option<DishGetHistoryResponse> {
        match self.response {
            Some(response::Response::DishGetHistory(history)) => Some(history),
            _ => None,
        }
    }

    pub fn into_wifi_get_status(self) -> Option<WifiGetStatusResponse> {
        match self.response {
            Some(response::Response::WifiGetStatus(status)) => Some(status),
            _ => None,
        }
    }

    pub fn into_get_ping(self) -> Option<GetPingResponse> {
        match self.response {
            Some(response::Response::GetPing(ping)) => Some(ping),
            _ => None,
        }
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DeviceInfo {
    #[prost(string, tag = "1")]
    pub id: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub hardware_version: ::prost::alloc::string::String,
    #[prost(string, tag = "3")]
    pub software_version: ::prost::alloc::string::String,
    #[prost(string, tag = "4")]
    pub country_code: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DishObstructionStats {
    #[prost(float, tag = "1")]
    pub fraction_obstructed: f32,
    /// One entry per 30 degree sector, starting at 0 degrees.
    #[prost(float, repeated, tag = "2")]
    pub wedge_fraction_obstructed: ::prost::alloc::vec::Vec<f32>,
    #[prost(float, repeated, tag = "3")]
    pub wedge_abs_fraction_obstructed: ::prost::alloc::vec::Vec<f32>,
    #[prost(float, tag = "4")]
    pub valid_s: f32,
    #[prost(bool, tag = "5")]
    pub currently_obstructed: bool,
    #[prost(float, tag = "1006")]
    pub last_24h_obstructed_s: f32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DishGetStatusResponse {
    #[prost(message, optional, tag = "1")]
    pub device_info: ::core::option::Option<DeviceInfo>,
    #[prost(message, optional, tag = "1004")]
    pub obstruction_stats: ::core::option::Option<DishObstructionStats>,
}

/// Ring buffers of one-second samples. All series share `current`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DishGetHistoryResponse {
    #[prost(uint64, tag = "1")]
    pub current: u64,
    #[prost(float, repeated, tag = "1001")]
    pub pop_ping_drop_rate: ::prost::alloc::vec::Vec<f32>,
    #[prost(float, repeated, tag = "1002")]
    pub pop_ping_latency_ms: ::prost::alloc::vec::Vec<f32>,
    #[prost(float, repeated, tag = "1003")]
    pub downlink_throughput_bps: ::prost::alloc::vec::Vec<f32>,
    #[prost(float, repeated, tag = "1004")]
    pub uplink_throughput_bps: ::prost::alloc::vec::Vec<f32>,
    #[prost(float, repeated, tag = "1005")]
    pub snr: ::prost::alloc::vec::Vec<f32>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct WifiGetStatusResponse {
    #[prost(message, optional, tag = "3")]
    pub device_info: ::core::option::Option<DeviceInfo>,
    #[prost(float, tag = "1001")]
    pub ping_drop_rate: f32,
    #[prost(float, tag = "1002")]
    pub ping_latency_ms: f32,
    #[prost(string, tag = "1003")]
    pub sku: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PingTarget {
    #[prost(string, tag = "1")]
    pub service: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub location: ::prost::alloc::string::String,
    #[prost(string, tag = "3")]
    pub address: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PingResult {
    #[prost(float, tag = "1")]
    pub drop_rate: f32,
    #[prost(float, tag = "2")]
    pub latency_ms: f32,
    #[prost(message, optional, tag = "3")]
    pub target: ::core::option::Option<PingTarget>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetPingResponse {
    #[prost(message, repeated, tag = "1")]
    pub results: ::prost::alloc::vec::Vec<PingResult>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use prost::Message;

    #[test]
    fn test_request_method_names() {
        assert_eq!(Request::get_status().method(), "GetStatus");
        assert_eq!(Request::get_history().method(), "GetHistory");
        assert_eq!(Request::get_ping().method(), "GetPing");
        assert_eq!(Request::default().method(), "Handle");
    }

    #[test]
    fn test_history_response_decodes_from_wire() {
        let history = DishGetHistoryResponse {
            current: 7,
            snr: vec![9.0, 9.5],
            ..Default::default()
        };
        let bytes = Response::dish_get_history(history.clone()).encode_to_vec();

        let decoded = Response::decode(bytes.as_slice()).unwrap();
        assert_eq!(decoded.into_dish_get_history(), Some(history));
    }

    #[test]
    fn test_unexpected_variant_yields_none() {
        let response = Response::get_ping(GetPingResponse::default());
        assert!(response.clone().into_dish_get_status().is_none());
        assert!(response.into_get_ping().is_some());
    }
}
