#![no_main]

use libfuzzer_sys::fuzz_target;
use widecol::composite::{decode_components, encode_components};
use widecol::Composite;

// Arbitrary bytes must either fail cleanly or decode to components that
// encode back to exactly the same bytes.
fuzz_target!(|data: &[u8]| {
    let Ok(components) = decode_components(data) else {
        return;
    };

    let encoded = encode_components(&components).expect("decoded components re-encode");
    assert_eq!(encoded.as_slice(), data, "re-encoding changed the bytes");

    let composite = Composite::decode(data.to_vec()).expect("valid bytes decode");
    assert_eq!(composite.components(), components.as_slice());
    assert_eq!(composite.encoded().data(), data);
});
