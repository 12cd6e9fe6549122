pub const HELP_MESSAGE: &str = "\
🤖 <b>Bot Help: Available Commands</b>\n\
\n\
- Use /pools to search pools with filtering and sorting options.\n\
- To filter, use <code>-f</code> followed by filter criteria.\n\
- To sort, use <code>-s</code> followed by sort criteria. <b>Sorting is always descending.</b>\n\
- Use /subscribe and /unsubscribe with the topics <code>newPools</code> and/or <code>increasedVolume</code> to manage notifications. /unsubscribe without topics removes everything.\n\
\n\
<b>Filtering Options</b> (<code>-f</code> flag):\n\
- <code>bin_step</code>: bin step value (default is 100 if not specified).\n\
- <code>base_fee</code>: base transaction fee percentage, e.g. <code>-f base_fee&lt;0.5</code>.\n\
- <code>max_fee</code>: maximum transaction fee percentage.\n\
- <code>protocol</code>: protocol fee percentage.\n\
- <code>liquidity</code>: pool liquidity, e.g. <code>-f liquidity&gt;5000</code> (default is &gt;0 if not specified).\n\
- <code>fees</code>: fees collected in the last 24 hours.\n\
- <code>volume</code>: trade volume in the last 24 hours.\n\
- <code>apr</code>: annual percentage rate, e.g. <code>-f apr&gt;=0.02</code>.\n\
\n\
<b>Sorting Options</b> (<code>-s</code> flag), always descending:\n\
- <code>liquidity</code>: sort by liquidity. Default when no sort is given.\n\
- <code>volume</code>: sort by 24-hour trade volume.\n\
- <code>fees</code>: sort by fees collected in the last 24 hours.\n\
- <code>apr</code>: sort by APR.\n\
\n\
<b>Example</b>:\n\
/pools <code>-f liquidity&gt;5000 bin_step=100 -s apr volume</code>\n\
Filters for pools with liquidity over 5000 and a bin step of 100, then sorts by APR and 24h volume, both descending.";
