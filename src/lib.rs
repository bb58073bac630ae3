//  ____  ____     __        __    __  __           _
// |  _ \|  _ \ __ \ \      / /__ |  \/  | __ _ ___| |_ ___ _ __
// | |_) | |_) / _` \ \/\ / / _ \| |\/| |/ _` / __| __/ _ \ '__|
// |  _ <|  __/ (_| |\ V  V / (_) | |  | | (_| \__ \ ||  __/ |
// |_| \_\_|   \__,_| \_/\_/ \___/|_|  |_|\__,_|___/\__\___|_|
//
// Author : Sidney Zhang <zly@lyzhang.me>
// Date : 2025-11-02
// Version : 0.1.0
// License : Mulan PSL v2
//
// Password generation, strength scoring and generation history.

pub mod configtool;
pub mod history;
pub mod passgen;
pub mod service;
pub mod strength;
pub mod textgen;
