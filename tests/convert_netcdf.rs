use std::path::Path;
use vortex_to_netcdf::{
    assemble_files, extract::read_slice, Assembler, ConvertConfig, ConvertError, GridSink,
    NetCdfSink, FILL_VALUE,
};

const F: f32 = FILL_VALUE;
const T0: i64 = 1_505_044_800;
const T1: i64 = 1_505_045_160;

fn data(name: &str) -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/data").join(name)
}

fn convert(with_log: bool, out: &Path) {
    let log = data("irma_vortexSummary.csv");
    let a = assemble_files(
        &data("irma_coefficientlist.csv"),
        with_log.then_some(log.as_path()),
        ConvertConfig::default(),
    )
    .unwrap();
    NetCdfSink::new(out).with_source("irma_coefficientlist.csv").emit(&a).unwrap();
}

#[test]
fn test_coefficients_written_sorted() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("irma.nc");
    convert(false, &out);

    let nc = netcdf::open(&out).unwrap();
    assert_eq!(nc.dimension("ntimes").unwrap().len(), 2);
    assert_eq!(nc.dimension("nlevels").unwrap().len(), 2);
    assert_eq!(nc.dimension("nradii").unwrap().len(), 3);

    let times: Vec<i64> = nc.variable("times").unwrap().get_values::<i64, _>(..).unwrap();
    assert_eq!(times, vec![T0, T1]);
    let levels: Vec<f32> = nc.variable("levels").unwrap().get_values::<f32, _>(..).unwrap();
    assert_eq!(levels, vec![1.0, 2.0]);
    let radii: Vec<f32> = nc.variable("radii").unwrap().get_values::<f32, _>(..).unwrap();
    assert_eq!(radii, vec![20.0, 21.0, 22.0]);

    let vtc0 = nc.variable("VTC0").unwrap();
    let dims: Vec<String> = vtc0.dimensions().iter().map(|d| d.name()).collect();
    assert_eq!(dims, vec!["nradii", "nlevels", "ntimes"]);
    let values: Vec<f32> = vtc0.get_values::<f32, _>(..).unwrap();
    assert_eq!(
        values,
        vec![F, 39.75, 42.25, F, 40.5, F, 44.5, F, F, 38.0, F, F]
    );

    let vrc1: Vec<f32> = nc.variable("VRC1").unwrap().get_values::<f32, _>(..).unwrap();
    assert_eq!(vrc1, vec![F, F, 3.5, F, F, F, F, -2.5, F, F, F, F]);

    assert!(nc.variable("vortex_lats").is_none());
}

#[test]
fn test_track_series_written() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("irma.nc");
    convert(true, &out);

    let nc = netcdf::open(&out).unwrap();
    let get = |name: &str| -> Vec<f32> {
        nc.variable(name).unwrap().get_values::<f32, _>(..).unwrap()
    };
    assert_eq!(get("vortex_lats"), vec![24.7, F]);
    assert_eq!(get("vortex_lons"), vec![-81.2, F]);
    assert_eq!(get("vortex_rmw"), vec![18.5, F]);
    assert_eq!(get("vortex_pressure"), vec![929.4, F]);
    assert_eq!(get("vortex_max_in"), vec![125.0, 118.0]);
    assert_eq!(get("vortex_max_out"), vec![101.5, 99.0]);
    assert_eq!(get("vortex_wind"), vec![F, F]);
}

#[test]
fn test_read_slice_back() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("irma.nc");
    convert(false, &out);

    let rows = read_slice(&out, "VTC0", 0, 1).unwrap();
    let got: Vec<(usize, f32, f32)> = rows.iter().map(|r| (r.radius_index, r.radius, r.value)).collect();
    assert_eq!(got, vec![(0, 20.0, 42.25), (1, 21.0, 44.5), (2, 22.0, F)]);

    assert!(matches!(
        read_slice(&out, "VTS9", 0, 0),
        Err(ConvertError::MissingVariable(_))
    ));
    assert!(matches!(
        read_slice(&out, "VTC0", 2, 0),
        Err(ConvertError::OutOfRange { axis: "time", .. })
    ));
    assert!(matches!(
        read_slice(&out, "times", 0, 0),
        Err(ConvertError::BadShape { .. })
    ));
}

#[test]
fn test_existing_output_is_replaced() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("irma.nc");
    std::fs::write(&out, b"not a netcdf file").unwrap();
    convert(false, &out);
    assert!(netcdf::open(&out).unwrap().variable("VTC0").is_some());
}

#[test]
fn test_empty_run_writes_unlimited_dimensions() {
    let dir = tempfile::tempdir().unwrap();

    // nothing at all
    let out = dir.path().join("empty.nc");
    let a = Assembler::new(ConvertConfig::default()).finish().unwrap();
    NetCdfSink::new(&out).emit(&a).unwrap();
    let nc = netcdf::open(&out).unwrap();
    for dim in ["ntimes", "nlevels", "nradii"] {
        let d = nc.dimension(dim).unwrap();
        assert_eq!(d.len(), 0, "{dim}");
        assert!(d.is_unlimited(), "{dim}");
    }
    let levels = nc.variable("levels").unwrap();
    assert!(levels.attribute("min").is_none());
    assert!(levels.attribute("units").is_some());

    // markers without data
    let out = dir.path().join("markers.nc");
    let mut asm = Assembler::new(ConvertConfig::default());
    asm.feed("# Vortex time: 2017-09-10:12:00").unwrap();
    asm.feed("# Vortex time: 2017-09-10:12:06").unwrap();
    NetCdfSink::new(&out).emit(&asm.finish().unwrap()).unwrap();
    let nc = netcdf::open(&out).unwrap();
    let ntimes = nc.dimension("ntimes").unwrap();
    assert_eq!(ntimes.len(), 2);
    assert!(!ntimes.is_unlimited());
    assert!(nc.dimension("nradii").unwrap().is_unlimited());
    let times: Vec<i64> = nc.variable("times").unwrap().get_values::<i64, _>(..).unwrap();
    assert_eq!(times, vec![T0, T1]);
}
