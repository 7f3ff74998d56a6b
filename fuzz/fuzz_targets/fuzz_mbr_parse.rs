#![no_main]
use imgverify::infrastructure::plugins::mbr::{enumerate_partitions, parse_partition_table, MBR_LEN};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let _ = parse_partition_table(data);

    // Treat the input as a small disk so EBR chains point back into it
    let sector_count = (data.len() / MBR_LEN) as u64;
    let _ = enumerate_partitions(sector_count, |lba| {
        let start = lba as usize * MBR_LEN;
        Ok(data[start..start + MBR_LEN].to_vec())
    });
});
