//! Snapshot tests for strided-common serialized forms.

use strided_common::{ConformanceConfig, ElementType, TransferSpec, VectorWidth};

#[test]
fn default_config_toml() {
    insta::assert_snapshot!(ConformanceConfig::default_toml().unwrap(), @r#"
    seed = 24301
    target_workgroups = 579
    direction = "both"
    backend = "reference"
    platform_index = 0
    device_index = 0
    reference_work_group_limit = 1024

    [logging]
    level = "info"
    format = "compact"
    "#);
}

#[test]
fn transfer_spec_json() {
    let spec = TransferSpec::new(ElementType::Half, VectorWidth::Three, 5).unwrap();
    insta::assert_json_snapshot!(spec, @r#"
    {
      "element_type": "half",
      "vector_width": 3,
      "stride": 5
    }
    "#);
}
