//! Smoke tests for basic functionality

use nandsim::{NandDevice, NandGeometry};

#[test]
fn test_version_exists() {
    // Verify the crate version string is valid semver
    let version = env!("CARGO_PKG_VERSION");
    assert!(!version.is_empty());
    let parts: Vec<&str> = version.split('.').collect();
    assert_eq!(parts.len(), 3, "Version should be semver: {version}");
}

#[test]
fn test_package_name() {
    let name = env!("CARGO_PKG_NAME");
    assert_eq!(name, "nandsim");
}

#[test]
fn test_device_start_stop_cycle() {
    let device = NandDevice::new(NandGeometry::new(512, 8, 16, 0));
    let info = device.start(Box::new(|| {})).unwrap();
    assert_eq!(info.total_size, 512 * 8 * 16);
    device.stop();
}

#[test]
fn test_zero_capacity_device_starts() {
    // Zero geometry is a valid unconfigured device, not an error.
    let device = NandDevice::new(NandGeometry::default());
    let info = device.start(Box::new(|| {})).unwrap();
    assert_eq!(info.total_size, 0);
    device.stop();
}
