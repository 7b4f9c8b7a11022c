#[cfg(test)]
mod integration_tests {
    use easyconf::cfg::{
        EasyConf, EasyConfConfig, FileSource, Filter, Layer, PropertiesParser, ReloadStrategy,
        Source,
    };
    use serde::Deserialize;
    use serial_test::serial;
    use std::fs;
    use std::path::Path;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::thread;
    use std::thread::sleep;
    use std::time::Duration;
    use tempfile::TempDir;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Limits {
        max: u32,
    }

    fn easyconf(dir: &TempDir) -> EasyConf {
        EasyConf::new(EasyConfConfig {
            search_paths: vec![dir.path().to_string_lossy().to_string()],
            search_home: false,
            load_env: false,
            ..Default::default()
        })
        .unwrap()
    }

    // 修改时间只有秒级精度的文件系统上，保证改写后的 mtime 晚于首次加载
    fn settle() {
        sleep(Duration::from_millis(1100));
    }

    #[test]
    #[serial]
    fn test_reload_after_delay() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("demo.properties");
        fs::write(&path, "easyconf:reload-delay=1\nx=old").unwrap();
        settle();

        let easyconf = easyconf(&temp_dir);
        let props = easyconf.get_configuration("demo").get_properties().unwrap();
        assert_eq!(props.delay_period(), Some(1));
        assert_eq!(props.get_string("x", &Filter::none()).unwrap().unwrap(), "old");

        fs::write(&path, "easyconf:reload-delay=1\nx=new").unwrap();
        // 检查间隔未到，仍然返回旧值
        assert_eq!(props.get_string("x", &Filter::none()).unwrap().unwrap(), "old");

        settle();
        assert_eq!(props.get_string("x", &Filter::none()).unwrap().unwrap(), "new");
    }

    #[test]
    #[serial]
    fn test_without_delay_never_reloads() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("demo.properties");
        fs::write(&path, "x=old").unwrap();
        settle();

        let easyconf = easyconf(&temp_dir);
        let props = easyconf.get_configuration("demo").get_properties().unwrap();
        assert_eq!(props.delay_period(), None);

        fs::write(&path, "x=new").unwrap();
        settle();
        assert_eq!(props.get_string("x", &Filter::none()).unwrap().unwrap(), "old");
    }

    #[test]
    #[serial]
    fn test_included_source_inherits_delay() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join("demo.properties"),
            "easyconf:reload-delay=1\ninclude-and-override=demo-env.properties",
        )
        .unwrap();
        let included = temp_dir.path().join("demo-env.properties");
        fs::write(&included, "x=old").unwrap();
        settle();

        let easyconf = easyconf(&temp_dir);
        let props = easyconf.get_configuration("demo").get_properties().unwrap();
        assert_eq!(props.get_string("x", &Filter::none()).unwrap().unwrap(), "old");

        fs::write(&included, "x=new").unwrap();
        settle();
        assert_eq!(props.get_string("x", &Filter::none()).unwrap().unwrap(), "new");
    }

    #[test]
    #[serial]
    fn test_configuration_object_reload() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("demo.properties"), "easyconf:reload-delay=1").unwrap();
        let object = temp_dir.path().join("demo.json");
        fs::write(&object, r#"{"max": 1}"#).unwrap();
        settle();

        let easyconf = easyconf(&temp_dir);
        let conf = easyconf.get_configuration("demo");
        assert_eq!(conf.get_configuration_object::<Limits>().unwrap(), Limits { max: 1 });

        fs::write(&object, r#"{"max": 2}"#).unwrap();
        assert_eq!(conf.get_configuration_object::<Limits>().unwrap(), Limits { max: 1 });

        settle();
        assert_eq!(conf.get_configuration_object::<Limits>().unwrap(), Limits { max: 2 });
    }

    // 先写临时文件再改名，读者不会读到写了一半的文件
    fn write_generation(path: &Path, generation: usize) {
        let tmp = path.with_extension("tmp");
        fs::write(
            &tmp,
            format!("a={0}\nb={0}\nc={0}\nd={0}\n", generation),
        )
        .unwrap();
        fs::rename(&tmp, path).unwrap();
    }

    #[test]
    #[serial]
    fn test_concurrent_readers_see_whole_generations() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("demo.properties");
        write_generation(&path, 0);

        let source = Source::File(FileSource::new(path.clone(), Arc::new(PropertiesParser::default())));
        let layer = Arc::new(
            Layer::load(path.display().to_string(), source)
                .unwrap()
                .with_reload(ReloadStrategy::file_changed(&path, 0)),
        );

        let done = Arc::new(AtomicBool::new(false));
        let readers: Vec<_> = (0..4)
            .map(|_| {
                let layer = layer.clone();
                let done = done.clone();
                thread::spawn(move || {
                    let mut snapshots = 0;
                    while !done.load(Ordering::Relaxed) || snapshots == 0 {
                        let snapshot = layer.snapshot();
                        let values: Vec<String> = ["a", "b", "c", "d"]
                            .iter()
                            .map(|key| snapshot.get(key).unwrap().joined())
                            .collect();
                        assert!(
                            values.iter().all(|v| v == &values[0]),
                            "mixed generations in one snapshot: {:?}",
                            values
                        );
                        snapshots += 1;
                    }
                    snapshots
                })
            })
            .collect();

        for generation in 1..=50 {
            write_generation(&path, generation);
            thread::sleep(Duration::from_millis(2));
        }
        done.store(true, Ordering::Relaxed);

        for reader in readers {
            assert!(reader.join().unwrap() > 0);
        }
    }

    #[test]
    #[serial]
    fn test_concurrent_first_construction() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("demo.properties"), "x=1").unwrap();
        let easyconf = Arc::new(easyconf(&temp_dir));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let easyconf = easyconf.clone();
                thread::spawn(move || {
                    let conf = easyconf.get_configuration("demo");
                    let props = conf.get_properties().unwrap();
                    assert_eq!(props.get_i32("x", &Filter::none()).unwrap(), Some(1));
                    conf
                })
            })
            .collect();
        let configurations: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(easyconf.cached_components(), 1);
        // 之后的查找都得到缓存中的同一个实例
        let cached = easyconf.get_configuration("demo");
        assert!(configurations.iter().any(|conf| Arc::ptr_eq(conf, &cached)));
        assert!(configurations.iter().all(|conf| **conf == *cached));
    }
}
