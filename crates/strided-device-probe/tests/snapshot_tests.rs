use strided_device_probe::{DeviceProfile, format_device_info};

#[test]
fn mock_device_info() {
    insta::assert_snapshot!(format_device_info(&DeviceProfile::Mock.snapshot()), @r"
    Device:          Mock GPU Device
    Compute units:   32
    Global memory:   8.00 GB
    Local memory:    64.00 KB
    Max workgroup:   1024
    Max item sizes:  [1024, 1024, 64]
    Unified memory:  false
    FP16:            true
    FP64:            true
    64-bit integers: true
    ");
}

#[test]
fn embedded_snapshot_json() {
    insta::assert_json_snapshot!(DeviceProfile::Embedded.snapshot(), @r#"
    {
      "name": "Embedded iGPU (profile)",
      "compute_units": 4,
      "local_memory_bytes": 32768,
      "global_memory_bytes": 536870912,
      "max_work_group_size": 256,
      "max_work_item_sizes": [
        256,
        256,
        256
      ],
      "host_unified_memory": true,
      "supports_fp16": true,
      "supports_fp64": false,
      "supports_64bit_int": false
    }
    "#);
}
