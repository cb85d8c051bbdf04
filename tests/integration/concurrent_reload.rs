use std::sync::Arc;
use std::thread;

use shotlint::config::Config;
use shotlint::lint::{LintSettings, Linter};
use shotlint::template::{CompiledTemplate, Selection, SharedTemplate, Template};

use crate::common;

fn assert_send_sync<T: Send + Sync>() {}

#[test]
fn compiled_artifacts_are_shareable_across_threads() {
    assert_send_sync::<Template>();
    assert_send_sync::<CompiledTemplate>();
    assert_send_sync::<SharedTemplate>();
    assert_send_sync::<Linter>();
}

#[test]
fn readers_see_old_or_new_template_during_replace() {
    let shared = Arc::new(SharedTemplate::new(common::scenario()));
    let mov_only = common::scenario_template()
        .with_selection("extension", Some(Selection::Many(vec!["mov".into()])))
        .unwrap();

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let shared = Arc::clone(&shared);
            thread::spawn(move || {
                for _ in 0..500 {
                    let snapshot = shared.load();
                    // One snapshot must answer consistently even if a
                    // replace lands in between.
                    let exr = snapshot.validate_filename("WTFB0101_comp_4k_v001.exr");
                    assert_eq!(exr.passed, snapshot.is_match("WTFB0101_comp_4k_v001.exr"));
                    assert!(snapshot.is_match("WTFB0101_comp_4k_v001.mov"));
                }
            })
        })
        .collect();

    let generation = shared.replace(&mov_only).unwrap();
    for reader in readers {
        reader.join().unwrap();
    }

    assert_eq!(generation, 1);
    assert_eq!(shared.generation(), 1);
    assert!(!shared.validate_filename("WTFB0101_comp_4k_v001.exr").passed);
    assert!(shared.validate_filename("WTFB0101_comp_4k_v001.mov").passed);
}

#[test]
fn failed_replace_keeps_previous_template() {
    let shared = SharedTemplate::new(common::scenario());
    let broken = common::scenario_template()
        .with_selection("extension", Some(Selection::One("tiff".into())))
        .unwrap();

    assert!(shared.replace(&broken).is_err());
    assert_eq!(shared.generation(), 0);
    assert!(shared.validate_filename("WTFB0101_comp_4k_v001.exr").passed);
}

#[test]
fn linters_share_one_template_snapshot_per_path() {
    let settings = LintSettings::from_config(&Config::default()).unwrap();
    let linter = Arc::new(Linter::new(SharedTemplate::new(common::scenario()), settings));

    let handles: Vec<_> = ["WTFB0101_comp_4k_v001.exr", "WTFB101_comp_4k_v001.exr"]
        .into_iter()
        .map(|path| {
            let linter = Arc::clone(&linter);
            thread::spawn(move || linter.lint_path(path).len())
        })
        .collect();
    let counts: Vec<usize> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(counts, [0, 1]);
}
