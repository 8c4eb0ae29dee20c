#![no_main]

use addrspace::xml::{read_nodeset, write_address_space};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        if let Ok(document) = read_nodeset(text) {
            let mut space = addrspace::nodeset::AddressSpace::new();
            if addrspace::merge::merge(&mut space, document).is_ok() {
                let _ = write_address_space(&space);
            }
        }
    }
});
