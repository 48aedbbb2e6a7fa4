//! Menu-driven vending machines.
//!
//! While a machine is active, raw input skips the parser and is matched
//! against a small literal command table. Purchases validate the choice,
//! stock, funds and inventory room in that order, and only then touch the
//! world.

use std::collections::BTreeMap;

use advent_core::{
    CoreResult, DescriptionTag, Entity, EntityKey, EntityKind, Flag, ItemProfile, Money, World,
};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{FictionError, FictionResult};

/// How a purchased item is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemTemplate {
    /// Display name.
    pub name: String,
    /// Descriptions; `Main` is required.
    pub descriptions: BTreeMap<DescriptionTag, String>,
    /// Nouns. Defaults to the lowercased name.
    #[serde(default)]
    pub synonyms: Vec<String>,
    /// Modifiers.
    #[serde(default)]
    pub adjectives: Vec<String>,
    /// Inventory slots.
    #[serde(default = "default_size")]
    pub size: u32,
    /// Flags for the new entity.
    #[serde(default = "default_flags")]
    pub flags: Vec<Flag>,
}

fn default_size() -> u32 {
    1
}

fn default_flags() -> Vec<Flag> {
    vec![Flag::Takeable]
}

impl ItemTemplate {
    /// Build an entity with this template under `key`.
    pub fn instantiate(&self, key: impl Into<EntityKey>) -> CoreResult<Entity> {
        let synonyms = if self.synonyms.is_empty() {
            vec![self.name.to_lowercase()]
        } else {
            self.synonyms.clone()
        };
        let profile = ItemProfile::new(synonyms)
            .with_adjectives(self.adjectives.clone())
            .with_size(self.size);
        Ok(Entity::with_descriptions(
            key,
            self.name.clone(),
            self.descriptions.clone(),
            EntityKind::Item,
        )?
        .with_profile(profile)
        .with_flags(self.flags.iter().copied()))
    }
}

/// One product slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Prefix for purchased entity keys.
    pub key: String,
    /// Menu name.
    pub name: String,
    /// Price in cents.
    pub price: Money,
    /// Units left.
    pub stock: u32,
    /// Menu description.
    #[serde(default)]
    pub blurb: String,
    /// The item handed over on purchase.
    pub item: ItemTemplate,
    /// Extra lines shown after buying this product.
    #[serde(default)]
    pub notes: Vec<String>,
}

/// The machine's canned remarks, one picked at random per occasion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Quips {
    /// On activation.
    pub greeting: Vec<String>,
    /// When the player cannot pay.
    pub insufficient_funds: Vec<String>,
    /// After a purchase.
    pub successful_purchase: Vec<String>,
    /// When a product is sold out.
    pub out_of_stock: Vec<String>,
    /// On leaving.
    pub goodbye: Vec<String>,
}

fn quip_lines(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

impl Default for Quips {
    fn default() -> Self {
        Self {
            greeting: quip_lines(&[
                "Insert coins to continue, or just admire my shiny chrome exterior.",
                "I've been waiting here all day for someone with loose change!",
            ]),
            insufficient_funds: quip_lines(&[
                "INSUFFICIENT FUNDS! What do I look like, a charity case?",
                "Your poverty is showing, friend. Come back with real money.",
                "Error 404: Money not found. Try checking your couch cushions.",
            ]),
            successful_purchase: quip_lines(&[
                "TRANSACTION COMPLETE! Pleasure doing business with you!",
                "Ka-ching! Your item is dispensed below. Don't forget to tip your machine!",
                "Sold! Another satisfied customer. Leave a 5-star review!",
            ]),
            out_of_stock: quip_lines(&[
                "ITEM OUT OF STOCK! Popular item, that one. Too bad for you.",
                "Sold out faster than tickets to a bathroom emergency convention.",
                "Nothing left but disappointment and the smell of opportunity lost.",
            ]),
            goodbye: quip_lines(&[
                "Come back soon! My loneliness is financially devastating.",
                "Thanks for visiting! I'll be here, dispensing and judging silently.",
                "Farewell! May your purchases serve you better than they served the last guy.",
            ]),
        }
    }
}

fn pick<R: Rng + ?Sized>(quips: &[String], rng: &mut R) -> Option<String> {
    if quips.is_empty() {
        return None;
    }
    quips.get(rng.random_range(0..quips.len())).cloned()
}

fn default_pocket_change() -> Money {
    Money::from_cents(50)
}

/// Outcome of one line of vending input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VendReply {
    /// Lines to show.
    pub lines: Vec<String>,
    /// The player walked away from the machine.
    pub left: bool,
    /// Entity created by a purchase.
    pub purchased: Option<EntityKey>,
}

impl VendReply {
    fn say(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }
}

const BORDER_WIDTH: usize = 60;

/// A vending machine and its menu state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendingMachine {
    /// Shown in the menu header.
    pub title: String,
    /// Products in menu order.
    pub products: Vec<Product>,
    /// Canned remarks.
    #[serde(default)]
    pub quips: Quips,
    /// Found by `money`.
    #[serde(default = "default_pocket_change")]
    pub pocket_change: Money,
    /// Shown after pocket change is found.
    #[serde(default)]
    pub pocket_tip: Option<String>,
    #[serde(skip)]
    active: bool,
    #[serde(skip)]
    sold: u32,
}

impl VendingMachine {
    /// A machine with default quips.
    pub fn new(title: impl Into<String>, products: Vec<Product>) -> Self {
        Self {
            title: title.into(),
            products,
            quips: Quips::default(),
            pocket_change: default_pocket_change(),
            pocket_tip: None,
            active: false,
            sold: 0,
        }
    }

    /// Check every product template can be built.
    pub fn validate(&self) -> FictionResult<()> {
        for product in &self.products {
            product.item.instantiate(product.key.as_str())?;
        }
        Ok(())
    }

    /// Whether the menu is open.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Open the menu: a greeting and the product list.
    pub fn activate<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Vec<String> {
        self.active = true;
        let mut out = vec![format!("*** WELCOME TO {} ***", self.title.to_uppercase())];
        out.extend(pick(&self.quips.greeting, rng));
        out.extend(self.menu());
        out
    }

    /// The product list and accepted commands.
    pub fn menu(&self) -> Vec<String> {
        let border = "=".repeat(BORDER_WIDTH);
        let mut out = vec![
            String::new(),
            border.clone(),
            format!("*** {} MENU ***", self.title.to_uppercase()),
            border.clone(),
            String::new(),
        ];
        for (i, product) in self.products.iter().enumerate() {
            let stock = if product.stock > 0 {
                format!("({} left)", product.stock)
            } else {
                "(SOLD OUT)".to_string()
            };
            out.push(format!("{}. {} - {} {stock}", i + 1, product.name, product.price));
            out.push(format!("   {}", product.blurb));
            out.push(String::new());
        }
        out.push(format!(
            "Commands: '1'-'{}' to buy, 'insert money', 'menu', 'leave'",
            self.products.len()
        ));
        out.push(border);
        out
    }

    /// Handle one line of input while the menu is open.
    pub fn handle_input<R: Rng + ?Sized>(
        &mut self,
        input: &str,
        world: &mut World,
        player: &str,
        rng: &mut R,
    ) -> FictionResult<VendReply> {
        let mut reply = VendReply::default();
        let command = input.trim().to_lowercase();

        if let Ok(number) = command.parse::<usize>() {
            self.purchase(number, world, player, rng, &mut reply)?;
            return Ok(reply);
        }

        match command.as_str() {
            "money" | "coin" | "coins" | "insert money" => {
                let stats = world.player_stats_mut(player)?;
                stats.money = stats.money.saturating_add(self.pocket_change);
                let total = stats.money;
                reply.say("*CLINK* Found some loose change in your pocket!");
                reply.say(format!("You now have {total}"));
                if let Some(tip) = &self.pocket_tip {
                    reply.say(tip.clone());
                }
            }
            "menu" | "help" | "look" | "?" => reply.lines.extend(self.menu()),
            "leave" | "exit" | "quit" | "done" => {
                reply.lines.extend(pick(&self.quips.goodbye, rng));
                self.active = false;
                reply.left = true;
            }
            _ => {
                reply.say("Invalid command! Valid options:");
                reply.say(format!("  1-{} - Buy item", self.products.len()));
                reply.say("  'money' - Insert coins");
                reply.say("  'menu' - Show menu");
                reply.say("  'leave' - Exit");
            }
        }
        Ok(reply)
    }

    fn purchase<R: Rng + ?Sized>(
        &mut self,
        number: usize,
        world: &mut World,
        player: &str,
        rng: &mut R,
        reply: &mut VendReply,
    ) -> FictionResult<()> {
        let count = self.products.len();
        let Some(index) = number.checked_sub(1).filter(|i| *i < count) else {
            reply.say(format!("Invalid item number. Choose 1-{count}."));
            return Ok(());
        };
        let product = &self.products[index];

        if product.stock == 0 {
            reply.lines.extend(pick(&self.quips.out_of_stock, rng));
            return Ok(());
        }

        let money = world
            .player_stats(player)
            .map(|stats| stats.money)
            .ok_or_else(|| FictionError::PlayerNotFound(player.into()))?;
        let Some(remaining) = money.checked_sub(product.price) else {
            reply.lines.extend(pick(&self.quips.insufficient_funds, rng));
            reply.say(format!("You need {} but only have {money}", product.price));
            return Ok(());
        };

        let mut serial = self.sold + 1;
        while world.contains_key(&format!("{}-{serial}", product.key)) {
            serial += 1;
        }
        let key = EntityKey::new(format!("{}-{serial}", product.key));
        let entity = product.item.instantiate(key.clone())?;
        let inventory = world.inventory_of(player)?.clone();
        let free = world
            .entity(inventory.as_str())?
            .as_container()
            .map_or(0, |state| state.capacity)
            .saturating_sub(world.slots_used(inventory.as_str()));
        if entity.size() > free {
            reply.say(format!(
                "Your INV is too full to carry the {}. Drop something first.",
                product.name
            ));
            return Ok(());
        }

        world.add_entity(entity.with_location(inventory))?;
        world.player_stats_mut(player)?.money = remaining;
        let price = product.price;
        let name = product.name.clone();
        let notes = product.notes.clone();
        self.products[index].stock -= 1;
        self.sold += 1;
        info!(product = %name, %price, key = %key, "vending purchase");

        reply.lines.extend(pick(&self.quips.successful_purchase, rng));
        reply.say(format!("You bought {name} for {price}"));
        reply.say(format!("Remaining money: {remaining}"));
        reply.lines.extend(notes);
        reply.purchased = Some(key);
        Ok(())
    }
}
