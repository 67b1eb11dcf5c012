use docrelay::config::{Config, ConfigError, OcrOutputType};

fn set_env(key: &str, value: &str) {
    // SAFETY: this binary holds a single test, so nothing reads the environment concurrently.
    unsafe { std::env::set_var(key, value) }
}

fn clear_env(key: &str) {
    // SAFETY: see `set_env`.
    unsafe { std::env::remove_var(key) }
}

#[test]
fn environment_drives_configuration() {
    for key in [
        "DOCRELAY_TIKA_ENDPOINT",
        "DOCRELAY_GOTENBERG_ENDPOINT",
        "DOCRELAY_OCR_OUTPUT_TYPE",
    ] {
        clear_env(key);
    }

    let defaults = Config::from_env().expect("defaults");
    assert_eq!(defaults.tika_endpoint, "http://localhost:9998");
    assert_eq!(defaults.gotenberg_endpoint, "http://localhost:3000");
    assert_eq!(defaults.ocr_output_type, OcrOutputType::Pdf);

    set_env("DOCRELAY_TIKA_ENDPOINT", "http://tika.internal:9998/");
    set_env("DOCRELAY_GOTENBERG_ENDPOINT", "  ");
    set_env("DOCRELAY_OCR_OUTPUT_TYPE", "pdfa-3");
    let overridden = Config::from_env().expect("overrides");
    assert_eq!(overridden.tika_endpoint, "http://tika.internal:9998");
    assert_eq!(overridden.gotenberg_endpoint, "http://localhost:3000");
    assert_eq!(overridden.ocr_output_type, OcrOutputType::PdfA3);

    set_env("DOCRELAY_OCR_OUTPUT_TYPE", "tiff");
    let error = Config::from_env().expect_err("unknown output type");
    assert!(matches!(error, ConfigError::InvalidValue(ref key) if key == "DOCRELAY_OCR_OUTPUT_TYPE"));

    set_env("DOCRELAY_OCR_OUTPUT_TYPE", "pdf");
    set_env("DOCRELAY_TIKA_ENDPOINT", "tika without scheme");
    let error = Config::from_env().expect_err("invalid url");
    assert!(matches!(error, ConfigError::InvalidValue(ref key) if key == "DOCRELAY_TIKA_ENDPOINT"));
}
