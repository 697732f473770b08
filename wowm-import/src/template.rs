//! Downloadable import template
//!
//! Documentation for operators, written as a valid import file: every
//! non-comment line is an example that parses.

use crate::error::ImportResult;
use std::path::Path;

/// Default file name for `wowm-import template`
pub const DEFAULT_TEMPLATE_FILE: &str = "import_template.txt";

/// Template text documenting the `name[,decor][,profession]` grammar
pub const IMPORT_TEMPLATE: &str = "\
# ==========================================
# BULK ITEM IMPORT TEMPLATE
# ==========================================
#
# RULES:
# - One item per line
# - At most 255 characters per line
# - Lines starting with # are comments
# - Empty lines are ignored
#
# ACCEPTED FORMATS:
# 1. Plain item:
#    Item name
#
# 2. Decorative item:
#    Item name,decor
#
# 3. Item with profession:
#    Item name,Enchanting
#    Item name,Alquimia   (Spanish names work too)
#
# 4. Decorative item with profession:
#    Item name,decor,Jewelcrafting
#
# ORDER MATTERS:
# - The name comes first
# - Then \"decor\" if the item is decorative (optional)
# - Then the profession (optional)
# - A comma inside a name is kept when the text after it is not
#   \"decor\" or a profession: Sword, of Doom
#
# SUPPORTED PROFESSIONS (English or Spanish):
# - Alchemy / Alquimia
# - Blacksmithing / Herrería
# - Enchanting / Encantamiento
# - Engineering / Ingeniería
# - Herbalism / Herboristería
# - Inscription / Inscripción
# - Jewelcrafting / Joyería
# - Leatherworking / Peletería
# - Mining / Minería
# - Skinning / Desuello
# - Tailoring / Sastrería
# - Cooking / Cocina
# - Fishing / Pesca
# - Archaeology / Arqueología
#
# EXAMPLES:
# ==========================================

# Plain items
Sword of the Valiant
Shield of Eternal Protection
Potion of Healing

# Decorative items
Golden Statue,decor
Ancient Tapestry,decor

# Items with profession (English)
Enchanted Vellum,Enchanting
Mithril Bar,Blacksmithing
Netherweave Cloth,Tailoring

# Items with profession (Spanish)
Poción de maná,Alquimia
Armadura de cuero,Peletería

# Decorative items with profession
Enchanted Crystal,decor,Enchanting
Jeweled Crown,decor,Jewelcrafting
Tótem decorativo,decor,Alquimia
";

/// Write the template to `path`
pub fn write_template(path: &Path) -> ImportResult<()> {
    std::fs::write(path, IMPORT_TEMPLATE)?;
    tracing::info!(path = %path.display(), "Import template written");
    Ok(())
}
