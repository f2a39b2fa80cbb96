#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    let engine = droplet::Engine::new();
    if let Ok(expr) = engine.compile_expression(data) {
        let _ = expr.evaluate_from(&droplet::Value::None);
    }
});
