#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    let engine = droplet::Engine::new();
    let _ = engine.compile(data);
});
