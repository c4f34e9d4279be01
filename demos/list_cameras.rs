//! Example: List and inspect connected PTP cameras
//!
//! Discovers still-image-class USB devices, connects to each one in turn,
//! and prints its aperture/ISO/shutter speed before disconnecting.
//!
//! Run with: cargo run --example list_cameras

use ptp_host::camera::connect_camera;
use ptp_host::discovery::{list_cameras, DeviceFilter};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let cameras = list_cameras(&DeviceFilter::default())?;
    println!("Found {} camera(s):\n", cameras.len());

    for descriptor in &cameras {
        println!("{descriptor}");

        let mut camera = match connect_camera(&descriptor.device) {
            Ok(camera) => camera,
            Err(e) => {
                println!("  failed to connect: {e}\n");
                continue;
            }
        };

        for (label, property) in [
            ("Aperture", "FNumber"),
            ("ISO", "ExposureIndex"),
            ("Shutter speed", "ExposureTime"),
        ] {
            match camera.get(property) {
                Ok(value) => println!("  {label}: {value:?}"),
                Err(e) => println!("  {label}: unavailable ({e})"),
            }
        }

        camera.disconnect();
        println!();
    }

    Ok(())
}
