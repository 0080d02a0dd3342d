// ==========================================
// 供应商目录导入 - 目录行模型
// ==========================================
// 目录格式: 固定 39 列，列序与表头文字不可更改
// 用途: 由 Product + 配置一次性构造，构造后不再修改
// ==========================================

use crate::domain::types::{format_number, CellValue, ProductStatus};
use serde::{Deserialize, Serialize};

/// 目录行固定列数
pub const CATALOG_WIDTH: usize = 39;

// ==========================================
// CatalogColumn - 目录列（0 起始下标）
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CatalogColumn {
    Handle = 0,
    Title = 1,
    Body = 2,
    Vendor = 3,
    ProductCategory = 4,
    Type = 5,
    Tags = 6,
    Published = 7,
    Option1Name = 8,
    Option1Value = 9,
    Option1LinkedTo = 10,
    Option2Name = 11,
    Option2Value = 12,
    Option2LinkedTo = 13,
    Option3Name = 14,
    Option3Value = 15,
    Option3LinkedTo = 16,
    VariantSku = 17,
    VariantGrams = 18,
    VariantInventoryTracker = 19,
    VariantInventoryQty = 20,
    VariantInventoryPolicy = 21,
    VariantFulfillmentService = 22,
    VariantPrice = 23,
    VariantCompareAtPrice = 24,
    VariantRequiresShipping = 25,
    VariantTaxable = 26,
    VariantBarcode = 27,
    ImageSrc = 28,
    ImagePosition = 29,
    ImageAltText = 30,
    GiftCard = 31,
    SeoTitle = 32,
    SeoDescription = 33,
    VariantImage = 34,
    VariantWeightUnit = 35,
    VariantTaxCode = 36,
    CostPerItem = 37,
    Status = 38,
}

impl CatalogColumn {
    /// 全部列（按下标顺序）
    pub const ALL: [CatalogColumn; CATALOG_WIDTH] = [
        CatalogColumn::Handle,
        CatalogColumn::Title,
        CatalogColumn::Body,
        CatalogColumn::Vendor,
        CatalogColumn::ProductCategory,
        CatalogColumn::Type,
        CatalogColumn::Tags,
        CatalogColumn::Published,
        CatalogColumn::Option1Name,
        CatalogColumn::Option1Value,
        CatalogColumn::Option1LinkedTo,
        CatalogColumn::Option2Name,
        CatalogColumn::Option2Value,
        CatalogColumn::Option2LinkedTo,
        CatalogColumn::Option3Name,
        CatalogColumn::Option3Value,
        CatalogColumn::Option3LinkedTo,
        CatalogColumn::VariantSku,
        CatalogColumn::VariantGrams,
        CatalogColumn::VariantInventoryTracker,
        CatalogColumn::VariantInventoryQty,
        CatalogColumn::VariantInventoryPolicy,
        CatalogColumn::VariantFulfillmentService,
        CatalogColumn::VariantPrice,
        CatalogColumn::VariantCompareAtPrice,
        CatalogColumn::VariantRequiresShipping,
        CatalogColumn::VariantTaxable,
        CatalogColumn::VariantBarcode,
        CatalogColumn::ImageSrc,
        CatalogColumn::ImagePosition,
        CatalogColumn::ImageAltText,
        CatalogColumn::GiftCard,
        CatalogColumn::SeoTitle,
        CatalogColumn::SeoDescription,
        CatalogColumn::VariantImage,
        CatalogColumn::VariantWeightUnit,
        CatalogColumn::VariantTaxCode,
        CatalogColumn::CostPerItem,
        CatalogColumn::Status,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// 表头文字
    pub fn label(self) -> &'static str {
        match self {
            CatalogColumn::Handle => "Handle",
            CatalogColumn::Title => "Title",
            CatalogColumn::Body => "Body (HTML)",
            CatalogColumn::Vendor => "Vendor",
            CatalogColumn::ProductCategory => "Product Category",
            CatalogColumn::Type => "Type",
            CatalogColumn::Tags => "Tags",
            CatalogColumn::Published => "Published",
            CatalogColumn::Option1Name => "Option1 Name",
            CatalogColumn::Option1Value => "Option1 Value",
            CatalogColumn::Option1LinkedTo => "Option1 Linked To",
            CatalogColumn::Option2Name => "Option2 Name",
            CatalogColumn::Option2Value => "Option2 Value",
            CatalogColumn::Option2LinkedTo => "Option2 Linked To",
            CatalogColumn::Option3Name => "Option3 Name",
            CatalogColumn::Option3Value => "Option3 Value",
            CatalogColumn::Option3LinkedTo => "Option3 Linked To",
            CatalogColumn::VariantSku => "Variant SKU",
            CatalogColumn::VariantGrams => "Variant Grams",
            CatalogColumn::VariantInventoryTracker => "Variant Inventory Tracker",
            CatalogColumn::VariantInventoryQty => "Variant Inventory Qty",
            CatalogColumn::VariantInventoryPolicy => "Variant Inventory Policy",
            CatalogColumn::VariantFulfillmentService => "Variant Fulfillment Service",
            CatalogColumn::VariantPrice => "Variant Price",
            CatalogColumn::VariantCompareAtPrice => "Variant Compare At Price",
            CatalogColumn::VariantRequiresShipping => "Variant Requires Shipping",
            CatalogColumn::VariantTaxable => "Variant Taxable",
            CatalogColumn::VariantBarcode => "Variant Barcode",
            CatalogColumn::ImageSrc => "Image Src",
            CatalogColumn::ImagePosition => "Image Position",
            CatalogColumn::ImageAltText => "Image Alt Text",
            CatalogColumn::GiftCard => "Gift Card",
            CatalogColumn::SeoTitle => "SEO Title",
            CatalogColumn::SeoDescription => "SEO Description",
            CatalogColumn::VariantImage => "Variant Image",
            CatalogColumn::VariantWeightUnit => "Variant Weight Unit",
            CatalogColumn::VariantTaxCode => "Variant Tax Code",
            CatalogColumn::CostPerItem => "Cost per item",
            CatalogColumn::Status => "Status",
        }
    }
}

/// 新建目标表时写入的表头行
pub fn header_row() -> Vec<String> {
    CatalogColumn::ALL
        .iter()
        .map(|c| c.label().to_string())
        .collect()
}

/// 布尔字段序列化为 "TRUE" / "FALSE"
pub fn bool_cell(value: bool) -> &'static str {
    if value {
        "TRUE"
    } else {
        "FALSE"
    }
}

// ==========================================
// CatalogRow - 目录行（一个商品变体）
// ==========================================
// 未填充的列（对比价、条码、图片、SEO、变体图片、税码、Option2/3）输出为空
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogRow {
    pub handle: String,
    pub title: String,
    pub body: String,
    pub vendor: String,
    pub product_category: String,
    pub product_type: String,
    pub tags: Vec<String>,
    pub published: bool,
    pub option1_name: String,
    pub option1_value: String,
    pub variant_sku: String,
    pub variant_grams: f64,
    pub variant_inventory_tracker: String,
    pub variant_inventory_qty: i64,
    pub variant_inventory_policy: String,
    pub variant_fulfillment_service: String,
    pub variant_price: f64,
    pub variant_requires_shipping: bool,
    pub variant_taxable: bool,
    pub gift_card: bool,
    pub variant_weight_unit: String,
    pub cost_per_item: f64,
    pub status: ProductStatus,
}

impl CatalogRow {
    /// Tags 列文本（", " 连接）
    pub fn tags_text(&self) -> String {
        self.tags.join(", ")
    }

    /// 取单列值（未填充列为空）
    pub fn cell(&self, column: CatalogColumn) -> CellValue {
        use CatalogColumn as C;
        match column {
            C::Handle => CellValue::from(self.handle.as_str()),
            C::Title => CellValue::from(self.title.as_str()),
            C::Body => CellValue::from(self.body.as_str()),
            C::Vendor => CellValue::from(self.vendor.as_str()),
            C::ProductCategory => CellValue::from(self.product_category.as_str()),
            C::Type => CellValue::from(self.product_type.as_str()),
            C::Tags => CellValue::from(self.tags_text()),
            C::Published => CellValue::from(bool_cell(self.published)),
            C::Option1Name => CellValue::from(self.option1_name.as_str()),
            C::Option1Value => CellValue::from(self.option1_value.as_str()),
            C::VariantSku => CellValue::from(self.variant_sku.as_str()),
            C::VariantGrams => CellValue::Number(self.variant_grams),
            C::VariantInventoryTracker => CellValue::from(self.variant_inventory_tracker.as_str()),
            C::VariantInventoryQty => CellValue::from(self.variant_inventory_qty),
            C::VariantInventoryPolicy => CellValue::from(self.variant_inventory_policy.as_str()),
            C::VariantFulfillmentService => {
                CellValue::from(self.variant_fulfillment_service.as_str())
            }
            C::VariantPrice => CellValue::Number(self.variant_price),
            C::VariantRequiresShipping => CellValue::from(bool_cell(self.variant_requires_shipping)),
            C::VariantTaxable => CellValue::from(bool_cell(self.variant_taxable)),
            C::GiftCard => CellValue::from(bool_cell(self.gift_card)),
            C::VariantWeightUnit => CellValue::from(self.variant_weight_unit.as_str()),
            C::CostPerItem => CellValue::Number(self.cost_per_item),
            C::Status => CellValue::from(self.status.to_string()),
            C::Option1LinkedTo
            | C::Option2Name
            | C::Option2Value
            | C::Option2LinkedTo
            | C::Option3Name
            | C::Option3Value
            | C::Option3LinkedTo
            | C::VariantCompareAtPrice
            | C::VariantBarcode
            | C::ImageSrc
            | C::ImagePosition
            | C::ImageAltText
            | C::SeoTitle
            | C::SeoDescription
            | C::VariantImage
            | C::VariantTaxCode => CellValue::Empty,
        }
    }

    /// 按列序展开为 39 个单元格
    pub fn to_cells(&self) -> Vec<CellValue> {
        CatalogColumn::ALL.iter().map(|c| self.cell(*c)).collect()
    }

    /// 按列序展开为 39 个文本字段（供 CSV 写出）
    pub fn to_record(&self) -> Vec<String> {
        CatalogColumn::ALL
            .iter()
            .map(|c| match self.cell(*c) {
                CellValue::Number(n) => format_number(n),
                other => other.as_text(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_row() -> CatalogRow {
        CatalogRow {
            handle: "amethyst-pendant".to_string(),
            title: "Amethyst Pendant".to_string(),
            body: String::new(),
            vendor: "Crystal Healing Co".to_string(),
            product_category: "Apparel & Accessories > Jewelry".to_string(),
            product_type: "Pendant".to_string(),
            tags: vec!["Spiritual".to_string(), "Amethyst".to_string()],
            published: true,
            option1_name: "Title".to_string(),
            option1_value: "Default Title".to_string(),
            variant_sku: "SKU001".to_string(),
            variant_grams: 0.0,
            variant_inventory_tracker: "shopify".to_string(),
            variant_inventory_qty: 3,
            variant_inventory_policy: "deny".to_string(),
            variant_fulfillment_service: "manual".to_string(),
            variant_price: 12.5,
            variant_requires_shipping: true,
            variant_taxable: false,
            gift_card: false,
            variant_weight_unit: "g".to_string(),
            cost_per_item: 5.0,
            status: ProductStatus::Active,
        }
    }

    #[test]
    fn test_column_indices_are_positional() {
        for (i, column) in CatalogColumn::ALL.iter().enumerate() {
            assert_eq!(column.index(), i);
        }
        assert_eq!(CatalogColumn::VariantSku.index(), 17);
        assert_eq!(CatalogColumn::Status.index(), 38);
    }

    #[test]
    fn test_header_row() {
        let header = header_row();
        assert_eq!(header.len(), CATALOG_WIDTH);
        assert_eq!(header[0], "Handle");
        assert_eq!(header[2], "Body (HTML)");
        assert_eq!(header[37], "Cost per item");
        assert_eq!(header[38], "Status");
    }

    #[test]
    fn test_to_record_layout() {
        let record = sample_row().to_record();

        assert_eq!(record.len(), CATALOG_WIDTH);
        assert_eq!(record[0], "amethyst-pendant");
        assert_eq!(record[6], "Spiritual, Amethyst");
        assert_eq!(record[7], "TRUE");
        assert_eq!(record[17], "SKU001");
        assert_eq!(record[20], "3");
        assert_eq!(record[23], "12.5");
        assert_eq!(record[24], "");
        assert_eq!(record[26], "FALSE");
        assert_eq!(record[27], "");
        assert_eq!(record[31], "FALSE");
        assert_eq!(record[37], "5");
        assert_eq!(record[38], "active");
    }
}
