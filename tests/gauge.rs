use gauge::layout::LabelRole;
use gauge::{Color, ColorBand, Gauge, GaugeConfig, GaugeError, LabelColor, Primitive};
use pretty_assertions::assert_eq;

fn value_label_text(gauge: &Gauge) -> Option<String> {
    gauge.layout().unwrap().iter().find_map(|p| match p {
        Primitive::TextLabel {
            text,
            role: LabelRole::Value,
            ..
        } => Some(text.clone()),
        _ => None,
    })
}

fn traffic_light() -> Vec<ColorBand> {
    vec![
        ColorBand::new(0.0, 25.0, "#FF0000".parse().unwrap()),
        ColorBand::new(25.0, 75.0, "#FFFF00".parse().unwrap()),
        ColorBand::new(75.0, 100.0, "#00FF00".parse().unwrap()),
    ]
}

#[test]
fn initializes_with_defaults() {
    let gauge = Gauge::new(GaugeConfig::default(), 50.0).unwrap();
    let config = gauge.config();

    assert_eq!(gauge.value(), 50.0);
    assert_eq!(config.min_value, 0.0);
    assert_eq!(config.max_value, 100.0);
    assert_eq!(config.needle_color, Color::BLACK);
    assert_eq!(config.needle_thickness, 8.0);
    assert!(config.show_value);
    assert_eq!(config.start_angle, 225.0);
    assert_eq!(config.end_angle, -45.0);
    assert_eq!(config.gauge_thickness, 0.1);
    assert_eq!(config.value_format, "{:.1f}");
    assert_eq!(config.value_font_family, "Arial, sans-serif");
    assert_eq!(config.value_font_size, 16.0);
    assert_eq!(config.tick_font_size, 10.0);
    assert_eq!(config.tick_label_radius, 1.1);
    assert_eq!(gauge.value_text(), "50.0");
}

#[test]
fn keeps_custom_values() {
    let config = GaugeConfig::builder()
        .min_value(10.0)
        .max_value(500.0)
        .needle_color("#FF0000".parse().unwrap())
        .needle_thickness(5.0)
        .show_value(false)
        .start_angle(180.0)
        .end_angle(0.0)
        .gauge_thickness(0.2)
        .value_format("{:.2f}%".to_string())
        .value_font_family("Helvetica, sans-serif".to_string())
        .value_font_size(20.0)
        .value_font_color("#FF5733".parse().unwrap())
        .tick_font_size(12.0)
        .tick_font_color("#3366FF".parse().unwrap())
        .build();
    let gauge = Gauge::new(config, 75.0).unwrap();

    assert_eq!(gauge.value(), 75.0);
    assert_eq!(gauge.config().needle_color, Color::rgb(0xff, 0, 0));
    assert_eq!(
        gauge.config().value_font_color,
        LabelColor::Fixed(Color::rgb(0xff, 0x57, 0x33))
    );
    assert_eq!(gauge.value_text(), "75.00%");
    assert_eq!(value_label_text(&gauge), None);
    assert!((gauge.needle_angle() - (180.0 - 180.0 * 65.0 / 490.0)).abs() < 1e-9);
}

#[test]
fn clamps_values_into_domain() {
    let mut gauge = Gauge::new(GaugeConfig::default(), 50.0).unwrap();
    gauge.set_value(150.0);
    assert_eq!(gauge.value(), 100.0);
    gauge.set_value(-10.0);
    assert_eq!(gauge.value(), 0.0);
}

#[test]
fn formats_value_label() {
    let cases = [
        ("{:.0f}", 50.0, "50"),
        ("{:.1f}%", 75.5, "75.5%"),
        ("${:.2f}", 99.99, "$99.99"),
    ];
    for (format, value, expected) in cases {
        let config = GaugeConfig::builder().value_format(format.to_string()).build();
        let gauge = Gauge::new(config, value).unwrap();
        assert_eq!(value_label_text(&gauge).as_deref(), Some(expected));
    }
}

#[test]
fn invalid_format_fails_at_construction() {
    let config = GaugeConfig::builder().value_format("{:.1q}".to_string()).build();
    assert!(matches!(
        Gauge::new(config, 1.0),
        Err(GaugeError::InvalidFormat { .. })
    ));
}

#[test]
fn auto_color_resolves_band_edges_deterministically() {
    let config = GaugeConfig::builder()
        .color_bands(traffic_light())
        .value_font_color(LabelColor::Auto)
        .build();
    let gauge = Gauge::new(config, 0.0).unwrap();

    assert_eq!(gauge.value_color().unwrap(), Color::rgb(0xff, 0, 0));
    assert_eq!(gauge.with_value(100.0).value_color().unwrap(), Color::rgb(0, 0xff, 0));
    assert_eq!(gauge.with_value(75.0).value_color().unwrap(), Color::rgb(0xff, 0xff, 0));
}

#[test]
fn auto_color_in_gap_is_a_configuration_error() {
    let config = GaugeConfig::builder()
        .color_bands(vec![
            ColorBand::new(0.0, 30.0, Color::rgb(0xff, 0, 0)),
            ColorBand::new(70.0, 100.0, Color::rgb(0, 0xff, 0)),
        ])
        .value_font_color(LabelColor::Auto)
        .build();
    let gauge = Gauge::new(config, 50.0).unwrap();

    assert_eq!(gauge.layout(), Err(GaugeError::NoBandForValue { value: 50.0 }));
    assert_eq!(gauge.value_color(), Err(GaugeError::NoBandForValue { value: 50.0 }));
    // Moving back into a band works again; nothing was cached.
    assert!(gauge.with_value(80.0).layout().is_ok());
}

#[test]
fn layout_is_idempotent() {
    let config = GaugeConfig::builder()
        .color_bands(traffic_light())
        .start_angle(-150.0)
        .end_angle(150.0)
        .needle_thickness(3.0)
        .build();
    let gauge = Gauge::new(config, 75.0).unwrap();
    assert_eq!(gauge.layout().unwrap(), gauge.layout().unwrap());
}

#[test]
fn json_config_drives_the_same_layout_as_the_builder() {
    let from_json = GaugeConfig::from_json(
        r##"{
            "min_value": 0,
            "max_value": 100,
            "color_bands": [
                {"min": 0, "max": 25, "color": "#FF0000"},
                {"min": 25, "max": 75, "color": "#FFFF00"},
                {"min": 75, "max": 100, "color": "#00FF00"}
            ],
            "value_font_color": "auto"
        }"##,
    )
    .unwrap();
    let built = GaugeConfig::builder()
        .color_bands(traffic_light())
        .value_font_color(LabelColor::Auto)
        .build();
    assert_eq!(from_json, built);

    let a = Gauge::new(from_json, 42.0).unwrap().layout().unwrap();
    let b = Gauge::new(built, 42.0).unwrap().layout().unwrap();
    assert_eq!(a, b);
}
