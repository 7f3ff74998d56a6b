#![no_main]
use imgverify::domain::repositories::ImagePlugin;
use imgverify::infrastructure::plugins::{Dc42Header, DiskCopy42Plugin};
use libfuzzer_sys::fuzz_target;
use std::io::Cursor;

fuzz_target!(|data: &[u8]| {
    let _ = Dc42Header::parse(data);

    // An accepted image must serve every sector it claims to have
    if let Ok(mut image) = DiskCopy42Plugin.open(Box::new(Cursor::new(data.to_vec()))) {
        let sectors = image.sector_count();
        let bytes = image.read_sectors(0, sectors).expect("header validated length");
        assert_eq!(bytes.len() as u64, sectors * 512);
        assert!(image.read_sectors(sectors, 1).is_err());
    }
});
