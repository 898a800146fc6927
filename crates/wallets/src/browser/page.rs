//! The embedded EIP-1193 wallet page served at the bridge root.
//!
//! The page connects the browser-extension wallet, reports the connection to
//! the bridge, then polls for queued transactions and answers each one with
//! the `eth_sendTransaction` result.

pub(crate) const INDEX_HTML: &str = r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Harvest Wallet Bridge</title>
<style>
  body { font-family: ui-monospace, monospace; background: #101014; color: #e6e6e6;
         display: flex; flex-direction: column; align-items: center; padding-top: 4rem; }
  h1 { font-size: 1.2rem; }
  #status { margin-top: 1rem; color: #9a9aa5; }
  #account { margin-top: 0.5rem; color: #7bd88f; }
  .error { color: #ff6b6b; }
</style>
</head>
<body>
<h1>Harvest Wallet Bridge</h1>
<p id="status">Connecting to wallet&hellip;</p>
<p id="account"></p>
<script>
const statusEl = document.getElementById('status');
const accountEl = document.getElementById('account');
const handled = new Set();

function setStatus(text, isError) {
  statusEl.textContent = text;
  statusEl.className = isError ? 'error' : '';
}

async function postJson(path, body) {
  await fetch(path, {
    method: 'POST',
    headers: { 'Content-Type': 'application/json' },
    body: JSON.stringify(body),
  });
}

async function reportConnection() {
  const accounts = await window.ethereum.request({ method: 'eth_accounts' });
  if (accounts.length === 0) {
    await postJson('/api/connection', null);
    setStatus('Wallet disconnected. Connect an account to continue.', true);
    return null;
  }
  const chainIdHex = await window.ethereum.request({ method: 'eth_chainId' });
  const connection = { address: accounts[0], chainId: parseInt(chainIdHex, 16) };
  await postJson('/api/connection', connection);
  accountEl.textContent = connection.address + ' (chain ' + connection.chainId + ')';
  return connection;
}

async function pollTransactions() {
  const resp = await fetch('/api/transaction/request');
  const body = await resp.json();
  if (body.status !== 'ok') return;

  const { id, ...tx } = body.data;
  if (handled.has(id)) return;
  handled.add(id);

  setStatus('Confirm the transaction in your wallet…');
  try {
    const hash = await window.ethereum.request({
      method: 'eth_sendTransaction',
      params: [tx],
    });
    await postJson('/api/transaction/response', { id, hash, error: null });
    setStatus('Transaction sent. Waiting for the next request…');
  } catch (err) {
    await postJson('/api/transaction/response', {
      id,
      hash: null,
      error: err && err.message ? err.message : 'User rejected the transaction',
    });
    setStatus('Transaction rejected. Waiting for the next request…', true);
  }
}

async function main() {
  if (!window.ethereum) {
    setStatus('No EIP-1193 wallet extension found in this browser.', true);
    return;
  }
  try {
    await window.ethereum.request({ method: 'eth_requestAccounts' });
  } catch (err) {
    setStatus('Wallet connection rejected.', true);
    return;
  }
  const connection = await reportConnection();
  if (connection) {
    setStatus('Wallet connected. Waiting for transaction requests…');
  }

  window.ethereum.on('accountsChanged', reportConnection);
  window.ethereum.on('chainChanged', reportConnection);

  setInterval(pollTransactions, 1000);
}

main();
</script>
</body>
</html>
"#;
