// omevlan-api: Async Rust client for the OpenManage Enterprise REST API

pub mod client;
pub mod error;
pub mod models;
pub mod networks;
pub mod session;
pub mod templates;
pub mod transport;

pub use client::{ApiResponse, OmeClient};
pub use error::Error;
pub use models::{
    Attribute, AttributeGroup, AttributeViewDetails, Network, Template, UpdateNetworkConfig,
    VlanAttribute,
};
pub use templates::NETWORK_HIERARCHY_VIEW;
pub use transport::{TlsMode, TransportConfig};
pub use reqwest::Method;
