//! Built-in power-grid component registry.
//!
//! Defines the `input`, `update`, `sym_output`, `asym_output` and
//! `sc_output` datasets. Attribute names and order match the record layouts
//! consumed by the calculation core, so positional rows written against the
//! natural order line up with those structs.

use once_cell::sync::Lazy;

use crate::ctype::CType::{self, Bool, Double, Double3, Int32, Int8};
use crate::error::MetaDataResult;
use crate::meta_data::{ComponentBuilder, ComponentMeta, DatasetMeta, MetaData};

static META_DATA: Lazy<MetaData> =
    Lazy::new(|| build_meta_data().expect("built-in component definitions are consistent"));

/// The built-in registry.
pub fn meta_data() -> &'static MetaData {
    &META_DATA
}

/// Build a fresh copy of the built-in registry.
pub fn build_meta_data() -> MetaDataResult<MetaData> {
    MetaData::new(vec![
        input_dataset()?,
        update_dataset()?,
        output_dataset("sym_output", Double)?,
        output_dataset("asym_output", Double3)?,
        sc_output_dataset()?,
    ])
}

const BRANCHES: [&str; 3] = ["line", "link", "transformer"];
const APPLIANCES: [&str; 6] = [
    "source",
    "sym_load",
    "sym_gen",
    "asym_load",
    "asym_gen",
    "shunt",
];
const VOLTAGE_SENSORS: [&str; 2] = ["sym_voltage_sensor", "asym_voltage_sensor"];
const POWER_SENSORS: [&str; 2] = ["sym_power_sensor", "asym_power_sensor"];

fn base(name: &str) -> ComponentBuilder {
    ComponentMeta::builder(name).attribute("id", Int32)
}

fn branch_input(name: &str) -> ComponentBuilder {
    base(name)
        .attributes(&["from_node", "to_node"], Int32)
        .attributes(&["from_status", "to_status"], Int8)
}

fn appliance_input(name: &str) -> ComponentBuilder {
    base(name)
        .attribute("node", Int32)
        .attribute("status", Int8)
}

fn load_gen_input(name: &str, real: CType) -> ComponentBuilder {
    appliance_input(name)
        .attribute("type", Int8)
        .attributes(&["p_specified", "q_specified"], real)
}

fn voltage_sensor_input(name: &str, real: CType) -> ComponentBuilder {
    base(name)
        .attribute("measured_object", Int32)
        .attribute("u_sigma", Double)
        .attributes(&["u_measured", "u_angle_measured"], real)
}

fn power_sensor_input(name: &str, real: CType) -> ComponentBuilder {
    base(name)
        .attribute("measured_object", Int32)
        .attribute("measured_terminal_type", Int8)
        .attribute("power_sigma", Double)
        .attributes(&["p_measured", "q_measured"], real)
}

fn fault(name: &str) -> ComponentBuilder {
    base(name)
        .attribute("status", Int8)
        .attributes(&["fault_type", "fault_phase"], Int8)
        .attribute("fault_object", Int32)
        .attributes(&["r_f", "x_f"], Double)
}

fn input_dataset() -> MetaDataResult<DatasetMeta> {
    let components = vec![
        base("node").attribute("u_rated", Double).build()?,
        branch_input("line")
            .attributes(
                &["r1", "x1", "c1", "tan1", "r0", "x0", "c0", "tan0", "i_n"],
                Double,
            )
            .build()?,
        branch_input("link").build()?,
        branch_input("transformer")
            .attributes(&["u1", "u2", "sn", "uk", "pk", "i0", "p0"], Double)
            .attributes(&["winding_from", "winding_to", "clock", "tap_side"], Int8)
            .attributes(&["tap_pos", "tap_min", "tap_max", "tap_nom"], Int8)
            .attributes(
                &[
                    "tap_size",
                    "uk_min",
                    "uk_max",
                    "pk_min",
                    "pk_max",
                    "r_grounding_from",
                    "x_grounding_from",
                    "r_grounding_to",
                    "x_grounding_to",
                ],
                Double,
            )
            .build()?,
        appliance_input("source")
            .attributes(
                &["u_ref", "u_ref_angle", "sk", "rx_ratio", "z01_ratio"],
                Double,
            )
            .build()?,
        load_gen_input("sym_load", Double).build()?,
        load_gen_input("sym_gen", Double).build()?,
        load_gen_input("asym_load", Double3).build()?,
        load_gen_input("asym_gen", Double3).build()?,
        appliance_input("shunt")
            .attributes(&["g1", "b1", "g0", "b0"], Double)
            .build()?,
        voltage_sensor_input("sym_voltage_sensor", Double).build()?,
        voltage_sensor_input("asym_voltage_sensor", Double3).build()?,
        power_sensor_input("sym_power_sensor", Double).build()?,
        power_sensor_input("asym_power_sensor", Double3).build()?,
        fault("fault").build()?,
        base("transformer_tap_regulator")
            .attribute("regulated_object", Int32)
            .attribute("status", Int8)
            .attribute("control_side", Int8)
            .attributes(
                &[
                    "u_set",
                    "u_band",
                    "line_drop_compensation_r",
                    "line_drop_compensation_x",
                ],
                Double,
            )
            .build()?,
    ];
    DatasetMeta::new("input", components)
}

fn update_dataset() -> MetaDataResult<DatasetMeta> {
    let status_update = |name: &str| base(name).attributes(&["from_status", "to_status"], Int8);
    let load_gen_update = |name: &str, real: CType| {
        base(name)
            .attribute("status", Int8)
            .attributes(&["p_specified", "q_specified"], real)
    };
    let components = vec![
        status_update("line").build()?,
        status_update("link").build()?,
        status_update("transformer")
            .attribute("tap_pos", Int8)
            .build()?,
        base("source")
            .attribute("status", Int8)
            .attributes(&["u_ref", "u_ref_angle"], Double)
            .build()?,
        load_gen_update("sym_load", Double).build()?,
        load_gen_update("sym_gen", Double).build()?,
        load_gen_update("asym_load", Double3).build()?,
        load_gen_update("asym_gen", Double3).build()?,
        base("shunt")
            .attribute("status", Int8)
            .attributes(&["g1", "b1", "g0", "b0"], Double)
            .build()?,
        base("sym_voltage_sensor")
            .attribute("u_sigma", Double)
            .attributes(&["u_measured", "u_angle_measured"], Double)
            .build()?,
        base("asym_voltage_sensor")
            .attribute("u_sigma", Double)
            .attributes(&["u_measured", "u_angle_measured"], Double3)
            .build()?,
        base("sym_power_sensor")
            .attribute("power_sigma", Double)
            .attributes(&["p_measured", "q_measured"], Double)
            .build()?,
        base("asym_power_sensor")
            .attribute("power_sigma", Double)
            .attributes(&["p_measured", "q_measured"], Double3)
            .build()?,
        fault("fault").build()?,
        base("transformer_tap_regulator")
            .attribute("status", Int8)
            .attributes(
                &[
                    "u_set",
                    "u_band",
                    "line_drop_compensation_r",
                    "line_drop_compensation_x",
                ],
                Double,
            )
            .build()?,
    ];
    DatasetMeta::new("update", components)
}

/// Steady-state output; `real` is `Double` for symmetric and `Double3` for
/// asymmetric calculations.
fn output_dataset(name: &str, real: CType) -> MetaDataResult<DatasetMeta> {
    let energized = |name: &str| base(name).attribute("energized", Bool);
    let mut components = vec![energized("node")
        .attributes(&["u_pu", "u", "u_angle", "p", "q"], real)
        .build()?];
    for branch in BRANCHES {
        components.push(
            energized(branch)
                .attribute("loading", Double)
                .attributes(
                    &[
                        "p_from", "q_from", "i_from", "s_from", "p_to", "q_to", "i_to", "s_to",
                    ],
                    real,
                )
                .build()?,
        );
    }
    for appliance in APPLIANCES {
        components.push(
            energized(appliance)
                .attributes(&["p", "q", "i", "s", "pf"], real)
                .build()?,
        );
    }
    for sensor in VOLTAGE_SENSORS {
        components.push(
            energized(sensor)
                .attributes(&["u_residual", "u_angle_residual"], real)
                .build()?,
        );
    }
    for sensor in POWER_SENSORS {
        components.push(
            energized(sensor)
                .attributes(&["p_residual", "q_residual"], real)
                .build()?,
        );
    }
    components.push(base("fault").build()?);
    components.push(
        energized("transformer_tap_regulator")
            .attribute("tap_pos", Int8)
            .build()?,
    );
    DatasetMeta::new(name, components)
}

/// Short-circuit output; all electrical quantities are per phase.
fn sc_output_dataset() -> MetaDataResult<DatasetMeta> {
    let energized = |name: &str| base(name).attribute("energized", Bool);
    let mut components = vec![energized("node")
        .attributes(&["u_pu", "u", "u_angle"], Double3)
        .build()?];
    for branch in BRANCHES {
        components.push(
            energized(branch)
                .attributes(&["i_from", "i_from_angle", "i_to", "i_to_angle"], Double3)
                .build()?,
        );
    }
    for appliance in APPLIANCES {
        components.push(
            energized(appliance)
                .attributes(&["i", "i_angle"], Double3)
                .build()?,
        );
    }
    for sensor in VOLTAGE_SENSORS.into_iter().chain(POWER_SENSORS) {
        components.push(energized(sensor).build()?);
    }
    components.push(
        base("fault")
            .attributes(&["i_f", "i_f_angle"], Double3)
            .build()?,
    );
    components.push(
        energized("transformer_tap_regulator")
            .attribute("tap_pos", Int8)
            .build()?,
    );
    DatasetMeta::new("sc_output", components)
}
