//! Infrastructure adapters: filesystem, remote services, rasterisation and
//! the preview server.

pub mod assets;
pub mod error;
pub mod fs;
pub mod google;
pub mod http;
pub mod indexnow;
pub mod output;
pub mod raster;
pub mod supabase;
pub mod telemetry;
