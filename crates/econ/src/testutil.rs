//! Shared fixtures for the pricing tests: a small two-breed herd
//! document, run plans per endpoint, and bare animals for ledger
//! arithmetic.

use std::sync::Arc;

use serde_json::json;

use herdmev_sim::base::{Date, Sex};
use herdmev_sim::simulation::{
    engine, Animal, MasterConfig, RunPlan, SaleEndpoint, SimulationContext,
};

use crate::params::{test_index_config, IndexTables};

/// One 100-cow spring herd, six traits, ten years of burn-in and ten
/// of planning horizon.
pub(crate) fn master_config() -> MasterConfig {
    let doc = json!({
        "genetics": {
            "traits": ["BW,80", "WW,500", "STAY,0.92", "HP,0", "CD,105", "MW,1250"],
            "components": ["BW,D", "WW,D", "WW,M", "STAY,D", "HP,D", "CD,D", "CD,M", "MW,D"],
            "genetic_covariance": [
                20.0, 20.0, 0.0, 0.0, 0.0, 8.0, 0.0, 20.0,
                20.0, 500.0, 0.0, 0.0, 0.0, 0.0, 0.0, 300.0,
                0.0, 0.0, 200.0, 0.0, 0.0, 0.0, 0.0, 0.0,
                0.0, 0.0, 0.0, 0.01, 0.0, 0.0, 0.0, 0.0,
                0.0, 0.0, 0.0, 0.0, 0.01, 0.0, 0.0, 0.0,
                8.0, 0.0, 0.0, 0.0, 0.0, 16.0, 0.0, 0.0,
                0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 9.0, 0.0,
                20.0, 300.0, 0.0, 0.0, 0.0, 0.0, 0.0, 2500.0
            ],
            "residual_covariance": [
                40.0, 30.0, 0.0, 0.0, 10.0, 0.0,
                30.0, 900.0, 0.0, 0.0, 0.0, 200.0,
                0.0, 0.0, 0.04, 0.0, 0.0, 0.0,
                0.0, 0.0, 0.0, 0.04, 0.0, 0.0,
                10.0, 0.0, 0.0, 0.0, 36.0, 0.0,
                0.0, 200.0, 0.0, 0.0, 0.0, 4900.0
            ]
        },
        "herds": ["spring,100,59,63,0.92,0.03"],
        "burnin": 10,
        "planning_horizon": 10,
        "calf_aum": 0.5,
        "cow_aum": 1.0,
        "foundation": {
            "n_bulls": 4,
            "bull_merit": [
                [0.0, "BW,D"], [0.0, "WW,D"], [0.0, "WW,M"], [0.0, "STAY,D"],
                [0.0, "HP,D"], [0.0, "CD,D"], [0.0, "CD,M"], [0.0, "MW,D"]
            ],
            "age_distribution": [0.2, 0.18, 0.16, 0.14, 0.12, 0.2]
        },
        "effects": {
            "breed_effects": [
                "Trait,Effect,Type,Angus,Hereford",
                "BW,D,Calf,0,2",
                "WW,D,Calf,0,5",
                "WW,M,Cow,0,-3",
                "STAY,D,Cow,0,0",
                "HP,D,Cow,0,0",
                "CD,D,Calf,0,1",
                "CD,M,Cow,0,0",
                "MW,D,Cow,0,40"
            ],
            "heterosis_codes": ["Angus,B", "Hereford,B"],
            "heterosis_values": [
                "Trait,Component,BxB",
                "BW,D,1.0",
                "WW,D,15.0",
                "WW,M,6.0",
                "STAY,D,0.05",
                "HP,D,0.02",
                "CD,D,0.0",
                "MW,D,20.0"
            ],
            "sex_aod": [
                "Angus,WW,M,-38,-18,-11,0,-22",
                "Angus,WW,F,-38,-18,-11,0,-22",
                "Angus,WW,C,-38,-18,-11,0,-22",
                "Angus,HP,F,0.9,0.9,0.9,0.9,0.9",
                "Angus,HP,C,0.9,0.9,0.9,0.9,0.9",
                "Hereford,HP,F,0.9,0.9,0.9,0.9,0.9",
                "Hereford,HP,C,0.9,0.9,0.9,0.9,0.9"
            ],
            "age_effects": ["WW,1.6,205", "STAY,0.0001,2190", "CD,0.0,730", "MW,0.35,1735"]
        },
        "composition": {
            "cow_herd": [[50.0, "Angus,100"], [50.0, "Angus,50,Hereford,50"]],
            "bull_battery": [[100.0, "Angus,100"]],
            "current_calves": [[100.0, "Angus,75,Hereford,25"]]
        }
    });
    serde_json::from_value(doc).expect("test master document")
}

pub(crate) fn weaning_plan(seed: u64) -> RunPlan {
    RunPlan {
        seed,
        endpoint: SaleEndpoint::Weaning,
        terminal: false,
        background_days: 0.0,
        days_on_feed: 0.0,
        bump: None,
    }
}

pub(crate) fn background_plan(seed: u64) -> RunPlan {
    RunPlan {
        seed,
        endpoint: SaleEndpoint::Background,
        terminal: false,
        background_days: 90.0,
        days_on_feed: 0.0,
        bump: None,
    }
}

pub(crate) fn feedlot_plan(seed: u64, endpoint: SaleEndpoint) -> RunPlan {
    RunPlan {
        seed,
        endpoint,
        terminal: false,
        background_days: 30.0,
        days_on_feed: 170.0,
        bump: None,
    }
}

/// A context with empty registry and yearly accumulators.
pub(crate) fn fresh_context(plan: RunPlan) -> SimulationContext {
    let setup = master_config().build().expect("test tables");
    SimulationContext::new(setup, plan).expect("test context")
}

/// A context after a full simulated run.
pub(crate) fn bred_context(plan: RunPlan) -> SimulationContext {
    let mut ctx = fresh_context(plan);
    engine::run(&mut ctx, &[]).expect("test run");
    ctx
}

/// A bare animal for ledger tests; no genetics attached.
pub(crate) fn calf(sex: Sex, year_born: i32, birth_date: Date) -> Animal {
    Animal::new(sex, Arc::from("spring"), birth_date, year_born)
}

/// Weaning-endpoint tables from the shared index document.
pub(crate) fn weaning_tables() -> IndexTables {
    test_index_config().build().expect("weaning tables")
}

/// Background-endpoint tables priced flat at $160/cwt.
pub(crate) fn background_tables() -> IndexTables {
    let mut config = test_index_config();
    config.sale_endpoint = SaleEndpoint::Background;
    config.background_days = Some(90.0);
    config.background_aum_cost = vec![22.0; 12];
    config
        .trait_sex_price_per_cwt
        .push("BG,S,0,9999,160.00".to_string());
    config
        .trait_sex_price_per_cwt
        .push("BG,F,0,9999,150.00".to_string());
    config.build().expect("background tables")
}

/// Fat-cattle tables priced flat on live weight.
pub(crate) fn fatcattle_tables() -> IndexTables {
    let mut config = test_index_config();
    config.sale_endpoint = SaleEndpoint::FatCattle;
    config.background_days = Some(30.0);
    config.background_aum_cost = vec![22.0; 12];
    config.days_on_feed = Some(170.0);
    config.feedlot_feed_cost = Some(0.11);
    config
        .trait_sex_price_per_cwt
        .push("FC,S,0,9999,185.00".to_string());
    config
        .trait_sex_price_per_cwt
        .push("FC,F,0,9999,183.00".to_string());
    config.build().expect("fat cattle tables")
}

/// Slaughter tables with a full grid schedule.
pub(crate) fn slaughter_tables(proportion_in_program: f64) -> IndexTables {
    let mut config = test_index_config();
    config.sale_endpoint = SaleEndpoint::SlaughterCattle;
    config.background_days = Some(30.0);
    config.background_aum_cost = vec![22.0; 12];
    config.days_on_feed = Some(170.0);
    config.feedlot_feed_cost = Some(0.11);
    config.proportion_in_program = proportion_in_program;
    for row in [
        "SC,S,0,599,280.00",
        "SC,S,600,900,290.00",
        "SC,S,900,9999,285.00",
        "SC,F,0,599,278.00",
        "SC,F,600,900,288.00",
        "SC,F,900,9999,283.00",
    ] {
        config.trait_sex_price_per_cwt.push(row.to_string());
    }
    config.grid_premiums = vec![
        "Prime,15.00,14.00,12.00,2.00,-8.00".to_string(),
        "Choice,4.00,3.00,0.00,-10.00,-15.00".to_string(),
        "Select,-8.00,-9.00,-11.00,-20.00,-25.00".to_string(),
        "Standard,-15.00,-16.00,-18.00,-28.00,-33.00".to_string(),
        "Program,4.00,4.00,3.00,0.00,0.00".to_string(),
    ];
    config.build().expect("slaughter tables")
}
