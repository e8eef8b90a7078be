#![no_main]
use codenav::{load_image, Navigable, NavigatorConfig, Region};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let config = NavigatorConfig::default();
    let Ok(image) = load_image(data, &config) else {
        return;
    };
    let Ok(mut nav) = image.navigator() else {
        return;
    };
    let margin = config.search.max_instruction_len;
    let end = nav.size_of_image();
    for target in [0, end / 3, end / 2, end] {
        let pos = nav.seek_vertical(target);
        assert!(nav.get_lines(pos, pos + 32).len() <= 32);
        nav.step_down(3);

        // Only near a region start: deeper moves assert that the stream
        // resynchronizes, which arbitrary bytes need not do.
        if nav.position() - margin <= nav.current().start() {
            let before = nav.current_index();
            if nav.step_up(1).is_err() {
                assert_eq!(nav.current_index(), before);
            }
        }
    }

    for region in nav.regions() {
        let Region::Code(code) = region else {
            continue;
        };
        let (start, last) = (code.start(), code.end());
        for anchor in [start, start + (last - start) / 2, last] {
            for count in [1, 4] {
                let found = code.find_previous_boundary(anchor, 0, count);
                assert!(found >= start && found <= anchor, "{found:#x} outside {start:#x}..={anchor:#x}");
            }
        }
    }
});
