use common_types::PoolRecord;

/// At most this many pools are rendered for an on-demand query.
pub const RESULT_CAP: usize = 10;
/// Blocks joined into one chat message.
pub const BLOCKS_PER_MESSAGE: usize = 4;

const POOL_PAGE: &str = "https://edge.meteora.ag/dlmm";
const DEXSCREENER: &str = "https://dexscreener.com/solana";
const GMGN: &str = "https://gmgn.ai/sol/token";

/// Renders one HTML block per pool, numbered from 1, in input order.
pub fn format_pools(pools: &[PoolRecord]) -> Vec<String> {
    pools
        .iter()
        .enumerate()
        .map(|(i, pool)| format_pool(i + 1, pool))
        .collect()
}

pub fn format_pool(index: usize, pool: &PoolRecord) -> String {
    let (token, mint) = headline_token(pool);
    let liquidity = pool.liquidity.parse::<f64>().unwrap_or(f64::NAN);
    format!(
        "<b>{index}. <a href=\"{POOL_PAGE}/{address}\">{name}</a></b>\n\
         Pool: <code>{address}</code>\n\
         ${token}: <code>{mint}</code>\n\
         Bin Step: {bin_step}\n\
         Liquidity: {liquidity:.2}\n\
         Fees24h: {fees:.2}\n\
         Volume24h: {volume:.2}\n\
         APR: {apr:.2}%\n\n\
         <a href=\"{DEXSCREENER}/{address}\">DexScreener</a> | \
         <a href=\"{GMGN}/{mint}\">GMGN</a>\n",
        address = pool.address,
        name = pool.name,
        bin_step = pool.bin_step,
        fees = pool.fees_24h,
        volume = pool.trade_volume_24h,
        apr = pool.apr,
    )
}

/// The non-SOL side of the pair and its mint; the pair name always splits
/// into exactly two symbols.
fn headline_token(pool: &PoolRecord) -> (String, String) {
    let mut symbols = pool.name.splitn(2, '-');
    let first = symbols.next().unwrap_or("").to_uppercase();
    let second = symbols.next().unwrap_or("").to_uppercase();
    if first == "SOL" {
        (second, pool.mint_y.clone())
    } else {
        (first, pool.mint_x.clone())
    }
}

/// Groups blocks into newline-joined messages of `per_message` blocks,
/// preserving order.
pub fn batch_messages(blocks: &[String], per_message: usize) -> Vec<String> {
    blocks
        .chunks(per_message.max(1))
        .map(|chunk| chunk.join("\n"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_pool() -> PoolRecord {
        PoolRecord {
            address: "Addr1".to_string(),
            name: "BOGUS-SOL".to_string(),
            mint_x: "MintX111".to_string(),
            mint_y: "MintY222".to_string(),
            bin_step: 100,
            liquidity: "1234.5".to_string(),
            fees_24h: 10.0,
            trade_volume_24h: 2000.0,
            apr: 0.05,
            ..Default::default()
        }
    }

    #[test]
    fn block_carries_the_expected_lines() {
        let block = format_pool(1, &sample_pool());
        assert!(block.contains("Liquidity: 1234.50"));
        assert!(block.contains("Fees24h: 10.00"));
        assert!(block.contains("Volume24h: 2000.00"));
        assert!(block.contains("APR: 0.05%"));
        assert!(block.contains("https://edge.meteora.ag/dlmm/Addr1"));
        assert!(block.contains("Bin Step: 100"));
    }

    #[test]
    fn non_sol_token_side_is_displayed() {
        // BOGUS-SOL: first symbol is the token of interest, mint_x its mint
        let block = format_pool(1, &sample_pool());
        assert!(block.contains("$BOGUS: <code>MintX111</code>"));

        let mut flipped = sample_pool();
        flipped.name = "SOL-BOGUS".to_string();
        let block = format_pool(1, &flipped);
        assert!(block.contains("$BOGUS: <code>MintY222</code>"));
    }

    #[test]
    fn blocks_are_numbered_in_order() {
        let pools = vec![sample_pool(), sample_pool(), sample_pool()];
        let blocks = format_pools(&pools);
        assert!(blocks[0].starts_with("<b>1. "));
        assert!(blocks[2].starts_with("<b>3. "));
    }

    #[test]
    fn batching_groups_blocks_in_order() {
        let blocks: Vec<String> = (0..9).map(|i| format!("block{i}")).collect();
        let messages = batch_messages(&blocks, 4);
        assert_eq!(messages.len(), 3);
        assert!(messages[0].contains("block0") && messages[0].contains("block3"));
        assert!(messages[1].starts_with("block4"));
        assert_eq!(messages[2], "block8");
    }
}
